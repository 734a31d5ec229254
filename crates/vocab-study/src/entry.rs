use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One English–Vietnamese vocabulary pair with its optional metadata.
///
/// Entries are owned by the repository; sessions hold read-only copies for
/// their whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: Uuid,
    pub english: String,
    pub vietnamese: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl VocabularyEntry {
    /// Build a bare entry with a fresh id and no metadata.
    pub fn new(english: impl Into<String>, vietnamese: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            english: english.into(),
            vietnamese: vietnamese.into(),
            phonetic: None,
            part_of_speech: None,
            example: None,
            synonyms: Vec::new(),
        }
    }

    /// Both sides must carry visible text.
    pub fn is_complete(&self) -> bool {
        !self.english.trim().is_empty() && !self.vietnamese.trim().is_empty()
    }

    /// Text of this entry in the given language.
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::Vietnamese => &self.vietnamese,
        }
    }
}

/// The two languages a set pairs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Vietnamese,
}

impl Language {
    /// BCP 47 tag handed to the presentation layer's speech output.
    pub const fn speech_tag(self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Vietnamese => "vi-VN",
        }
    }
}

/// Which language is shown as the prompt and which is expected back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    EnglishToVietnamese,
    VietnameseToEnglish,
}

impl Direction {
    pub const fn reversed(self) -> Self {
        match self {
            Self::EnglishToVietnamese => Self::VietnameseToEnglish,
            Self::VietnameseToEnglish => Self::EnglishToVietnamese,
        }
    }

    pub const fn prompt_language(self) -> Language {
        match self {
            Self::EnglishToVietnamese => Language::English,
            Self::VietnameseToEnglish => Language::Vietnamese,
        }
    }

    pub const fn answer_language(self) -> Language {
        match self {
            Self::EnglishToVietnamese => Language::Vietnamese,
            Self::VietnameseToEnglish => Language::English,
        }
    }

    pub fn prompt_of(self, entry: &VocabularyEntry) -> &str {
        entry.text(self.prompt_language())
    }

    pub fn answer_of(self, entry: &VocabularyEntry) -> &str {
        entry.text(self.answer_language())
    }
}
