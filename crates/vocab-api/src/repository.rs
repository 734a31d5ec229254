//! Postgres-backed [`VocabularyRepository`].

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use vocab_db::{models::VocabularyItem, repositories::vocabulary};
use vocab_study::{RepositoryError, VocabularyEntry, VocabularyRepository};

use crate::metrics::record_repository_query;

#[derive(Debug, Clone)]
pub struct PgVocabularyRepository {
    pool: PgPool,
}

impl PgVocabularyRepository {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, set_id: Uuid) -> Result<Option<Vec<VocabularyItem>>, sqlx::Error> {
        if vocabulary::get_set(&self.pool, set_id).await?.is_none() {
            return Ok(None);
        }
        vocabulary::get_items_for_set(&self.pool, set_id)
            .await
            .map(Some)
    }
}

#[async_trait]
impl VocabularyRepository for PgVocabularyRepository {
    async fn get_items_for_set(&self, set_id: Uuid) -> Result<Vec<VocabularyEntry>, RepositoryError> {
        let start = Instant::now();
        let result = self.fetch(set_id).await;
        record_repository_query(
            "get_items_for_set",
            start.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        match result {
            Ok(Some(items)) => Ok(items.into_iter().map(into_entry).collect()),
            Ok(None) => Err(RepositoryError::NotFound(set_id)),
            Err(err) => {
                tracing::error!(%set_id, error = %err, "vocabulary query failed");
                Err(RepositoryError::Network(err.to_string()))
            }
        }
    }
}

fn into_entry(item: VocabularyItem) -> VocabularyEntry {
    VocabularyEntry {
        id: item.id,
        english: item.english,
        vietnamese: item.vietnamese,
        phonetic: item.phonetic,
        part_of_speech: item.part_of_speech,
        example: item.example,
        synonyms: item.synonyms,
    }
}
