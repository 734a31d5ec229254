use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{VocabularyItem, VocabularySet};

pub async fn get_set<'e, E>(executor: E, set_id: Uuid) -> Result<Option<VocabularySet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, title, description, created_at, updated_at
            FROM vocabulary_sets
            WHERE id = $1
        "#,
    )
    .bind(set_id)
    .fetch_optional(executor)
    .await
}

/// Items of a set in their stored order.
pub async fn get_items_for_set<'e, E>(executor: E, set_id: Uuid) -> Result<Vec<VocabularyItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                id,
                set_id,
                english,
                vietnamese,
                phonetic,
                part_of_speech,
                example,
                synonyms,
                position,
                created_at
            FROM vocabulary_items
            WHERE set_id = $1
            ORDER BY position, created_at
        "#,
    )
    .bind(set_id)
    .fetch_all(executor)
    .await
}
