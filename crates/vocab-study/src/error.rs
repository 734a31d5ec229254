use thiserror::Error;
use uuid::Uuid;

/// Failures reported by a [`VocabularyRepository`](crate::VocabularyRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("vocabulary set {0} not found")]
    NotFound(Uuid),
    #[error("network error: {0}")]
    Network(String),
}

/// Everything a study session can refuse to do.
///
/// Every variant is returned before any state is touched: an operation
/// that fails leaves the session exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudyError {
    #[error("not enough vocabulary items: {required} required, {available} available")]
    InsufficientData { required: usize, available: usize },
    #[error("failed to load vocabulary: {0}")]
    RepositoryFailure(#[from] RepositoryError),
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
    #[error("answer feedback is still showing")]
    FeedbackPending,
    #[error("no question is active in the {0} phase")]
    NoActiveQuestion(String),
    #[error("cannot continue: {0}")]
    InvalidTransition(&'static str),
    #[error("there are no incorrect answers to retry")]
    NothingToRetry,
    #[error("hints are only available for spelling questions")]
    HintUnavailable,
}

impl StudyError {
    /// Whether retrying the same request later can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RepositoryFailure(RepositoryError::Network(_)))
    }
}
