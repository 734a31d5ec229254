use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Direction, VocabularyEntry,
    answer::{AnswerMatcher, is_blank},
    error::StudyError,
    session::Phase,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    Spelling,
}

impl QuestionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::Spelling => "spelling",
        }
    }
}

/// The pass of a session a question was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Pass {
    Learn { phase: Phase },
    Comprehensive { round: u32 },
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Learn { phase } => write!(f, "{phase}"),
            Self::Comprehensive { round } => write!(f, "comprehensive-{round}"),
        }
    }
}

/// Unique within a session: source entry, pass and position in that pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId {
    pub entry: Uuid,
    pub pass: Pass,
    pub index: usize,
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.entry, self.pass, self.index)
    }
}

/// An ephemeral prompt/answer pair derived from one entry for one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub correct_answer: String,
    pub kind: QuestionKind,
    /// Present only for multiple choice; contains `correct_answer` exactly once.
    pub options: Option<Vec<String>>,
    pub direction: Direction,
    pub source_entry: VocabularyEntry,
}

impl Question {
    /// Judge a submission. Blank text and, for multiple choice, anything that
    /// is not one of the offered options are rejected rather than scored.
    pub fn evaluate(&self, submitted: &str, matcher: &AnswerMatcher) -> Result<bool, StudyError> {
        if is_blank(submitted) {
            return Err(StudyError::InvalidSubmission(
                "answer cannot be empty".to_string(),
            ));
        }

        match (&self.kind, &self.options) {
            (QuestionKind::MultipleChoice, Some(options)) => {
                if !options.iter().any(|o| o == submitted) {
                    return Err(StudyError::InvalidSubmission(format!(
                        "'{submitted}' is not one of the offered options"
                    )));
                }
                Ok(submitted == self.correct_answer)
            }
            _ => Ok(matcher.matches(submitted, &self.correct_answer)),
        }
    }

    /// First two characters of the expected answer.
    pub fn hint(&self) -> String {
        self.correct_answer.trim().chars().take(2).collect()
    }
}
