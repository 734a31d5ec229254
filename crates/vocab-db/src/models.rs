use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named collection of vocabulary items.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularySet {
    pub id: Uuid,
    /// Display title (max 255 chars)
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One English–Vietnamese pair belonging to a set.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VocabularyItem {
    pub id: Uuid,
    /// Owning set (indexed together with `position`)
    pub set_id: Uuid,
    pub english: String,
    pub vietnamese: String,
    /// IPA or other pronunciation guide
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
    /// Example sentence using the word
    pub example: Option<String>,
    pub synonyms: Vec<String>,
    /// Order of the item inside its set
    pub position: i32,
    pub created_at: DateTime<Utc>,
}
