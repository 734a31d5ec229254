//! The asynchronous boundary between sessions and vocabulary storage.

use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    VocabularyEntry,
    error::{RepositoryError, StudyError},
};

/// Read access to vocabulary sets.
#[async_trait]
pub trait VocabularyRepository: Send + Sync {
    /// Items of one set, in the set's own order.
    async fn get_items_for_set(&self, set_id: Uuid) -> Result<Vec<VocabularyEntry>, RepositoryError>;
}

/// Fetch a set's items and require at least `required` of them.
pub async fn load_entries<Repo>(
    repo: &Repo,
    set_id: Uuid,
    required: usize,
) -> Result<Vec<VocabularyEntry>, StudyError>
where
    Repo: VocabularyRepository + ?Sized,
{
    let entries = repo.get_items_for_set(set_id).await.map_err(|err| {
        tracing::warn!(%set_id, %err, "failed to load vocabulary set");
        StudyError::from(err)
    })?;

    let available = entries.iter().filter(|e| e.is_complete()).count();
    if available < required.max(1) {
        return Err(StudyError::InsufficientData {
            required: required.max(1),
            available,
        });
    }

    tracing::debug!(%set_id, items = entries.len(), "loaded vocabulary set");
    Ok(entries)
}

/// What a host shows while a session's items are being fetched.
#[derive(Debug)]
pub enum LoadState<T> {
    Loading,
    Failed(StudyError),
    Ready(T),
}

impl<T> LoadState<T> {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Failed(_) => "failed",
            Self::Ready(_) => "ready",
        }
    }

    pub const fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub const fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub const fn error(&self) -> Option<&StudyError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

impl<T> From<Result<T, StudyError>> for LoadState<T> {
    fn from(result: Result<T, StudyError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// A repository held in memory, for tests and local demos.
///
/// Sets can be marked unreachable to exercise the failure path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    sets: Arc<RwLock<HashMap<Uuid, Vec<VocabularyEntry>>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entries` under a fresh id and return it.
    pub fn insert_set(&self, entries: Vec<VocabularyEntry>) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(mut sets) = self.sets.write() {
            sets.insert(id, entries);
        }
        id
    }

    /// While offline every lookup fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }
}

#[async_trait]
impl VocabularyRepository for InMemoryRepository {
    async fn get_items_for_set(&self, set_id: Uuid) -> Result<Vec<VocabularyEntry>, RepositoryError> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(RepositoryError::Network("repository is offline".to_string()));
        }
        self.sets
            .read()
            .map_err(|_| RepositoryError::Network("repository lock poisoned".to_string()))?
            .get(&set_id)
            .cloned()
            .ok_or(RepositoryError::NotFound(set_id))
    }
}
