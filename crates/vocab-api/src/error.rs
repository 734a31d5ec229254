use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;
use vocab_study::{RepositoryError, StudyError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Study(#[from] StudyError),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),
    #[error("Session {0} is still loading")]
    SessionLoading(Uuid),
    #[error("Session {0} has no failed load to retry")]
    NotReloadable(Uuid),
    #[error("Too many active sessions")]
    Capacity,
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Study(err) => match err {
                StudyError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                StudyError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
                StudyError::RepositoryFailure(RepositoryError::NotFound(_)) => {
                    StatusCode::NOT_FOUND
                }
                StudyError::RepositoryFailure(RepositoryError::Network(_)) => {
                    StatusCode::BAD_GATEWAY
                }
                StudyError::FeedbackPending
                | StudyError::NoActiveQuestion(_)
                | StudyError::InvalidTransition(_)
                | StudyError::NothingToRetry
                | StudyError::HintUnavailable => StatusCode::CONFLICT,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionLoading(_) | Self::NotReloadable(_) => StatusCode::CONFLICT,
            Self::Capacity => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Study(err) => study_error_kind(err),
            Self::Validation(_) => "validation",
            Self::SessionNotFound(_) => "session_not_found",
            Self::SessionLoading(_) => "session_loading",
            Self::NotReloadable(_) => "not_reloadable",
            Self::Capacity => "capacity",
            Self::Internal(_) => "internal",
        }
    }

    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Study(err) => err.is_retryable(),
            Self::SessionLoading(_) | Self::Capacity => true,
            _ => false,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            retryable: self.is_retryable(),
        }
    }
}

pub const fn study_error_kind(err: &StudyError) -> &'static str {
    match err {
        StudyError::InsufficientData { .. } => "insufficient_data",
        StudyError::RepositoryFailure(RepositoryError::NotFound(_)) => "set_not_found",
        StudyError::RepositoryFailure(RepositoryError::Network(_)) => "repository_unavailable",
        StudyError::InvalidSubmission(_) => "invalid_submission",
        StudyError::FeedbackPending => "feedback_pending",
        StudyError::NoActiveQuestion(_) => "no_active_question",
        StudyError::InvalidTransition(_) => "invalid_transition",
        StudyError::NothingToRetry => "nothing_to_retry",
        StudyError::HintUnavailable => "hint_unavailable",
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(StudyError::InsufficientData {
                    required: 1,
                    available: 0,
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(StudyError::InvalidSubmission("empty".into())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(StudyError::FeedbackPending), StatusCode::CONFLICT),
            (ApiError::from(StudyError::NothingToRetry), StatusCode::CONFLICT),
            (
                ApiError::from(StudyError::RepositoryFailure(RepositoryError::NotFound(
                    Uuid::nil(),
                ))),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(StudyError::RepositoryFailure(RepositoryError::Network(
                    "timeout".into(),
                ))),
                StatusCode::BAD_GATEWAY,
            ),
            (ApiError::SessionNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (ApiError::Capacity, StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }

    #[test]
    fn test_network_failure_is_retryable() {
        let err = ApiError::from(StudyError::RepositoryFailure(RepositoryError::Network(
            "down".into(),
        )));
        let body = err.body();
        assert_eq!(body.error, "repository_unavailable");
        assert!(body.retryable);
        assert!(!ApiError::from(StudyError::HintUnavailable).is_retryable());
    }
}
