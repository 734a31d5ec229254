use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::{error::ErrorBody, state::ApiState, study};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(study::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "not_found",
            message: "The requested resource was not found".to_string(),
            retryable: false,
        }),
    )
}
