use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;
use vocab_study::{AnswerOutcome, ComprehensiveOptions, LearnOptions, load_entries};

use super::{
    model::{
        AnswerRequest, HintResponse, ScoreResponse, SessionView, StartComprehensiveRequest,
        StartLearnRequest,
    },
    registry::{SessionKind, SessionRequest},
};
use crate::{ApiState, error::ApiError, metrics};

/// Create the study routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/sets/{set_id}/learn", post(start_learn))
        .route("/sets/{set_id}/comprehensive", post(start_comprehensive))
        .route("/sessions/{id}", get(get_session).delete(end_session))
        .route("/sessions/{id}/answer", post(submit_answer))
        .route("/sessions/{id}/advance", post(advance))
        .route("/sessions/{id}/hint", post(hint))
        .route("/sessions/{id}/score", get(score))
        .route("/sessions/{id}/restart", post(restart))
        .route("/sessions/{id}/retry-incorrect", post(retry_incorrect))
        .route("/sessions/{id}/reload", post(reload))
}

async fn start_learn(
    State(state): State<ApiState>,
    Path(set_id): Path<Uuid>,
    Json(payload): Json<StartLearnRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let kind = SessionKind::Learn(LearnOptions {
        direction: payload.direction,
        mode: payload.mode,
    });
    start_session(&state, SessionRequest { set_id, kind }).await
}

async fn start_comprehensive(
    State(state): State<ApiState>,
    Path(set_id): Path<Uuid>,
    Json(payload): Json<StartComprehensiveRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let kind = SessionKind::Comprehensive(ComprehensiveOptions {
        direction: payload.direction,
    });
    start_session(&state, SessionRequest { set_id, kind }).await
}

/// Reserve a slot, load the set and start the session.
///
/// A load that fails for good (unknown set, too few items) frees the slot
/// and is returned as an error. A retryable failure keeps the slot in the
/// `failed` state so the client can reload it.
async fn start_session(
    state: &ApiState,
    request: SessionRequest,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let id = state.registry.reserve(request)?;
    tracing::debug!(session_id = %id, set_id = %request.set_id, "loading vocabulary set");

    let loaded = load_entries(state.repo.as_ref(), request.set_id, 1).await;
    if let Err(err) = &loaded
        && !err.is_retryable()
    {
        state.registry.remove(id)?;
        return Err(err.clone().into());
    }

    let view = state.registry.complete_load(id, loaded)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn reload(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let request = state.registry.begin_reload(id)?;
    let loaded = load_entries(state.repo.as_ref(), request.set_id, 1).await;
    Ok(Json(state.registry.complete_load(id, loaded)?))
}

async fn get_session(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.registry.view(id)?))
}

async fn submit_answer(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<AnswerOutcome>, ApiError> {
    payload.validate()?;

    let (kind, outcome) = state.registry.with_ready(id, |session| {
        let kind = session.study().current_question().map(|q| q.kind);
        let outcome = session.study_mut().submit_answer(&payload.text)?;
        Ok((kind, outcome))
    })?;
    if let Some(kind) = kind {
        metrics::record_answer(kind, outcome.is_correct);
    }

    Ok(Json(outcome))
}

async fn advance(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .registry
        .with_ready(id, |session| session.study_mut().advance())?;
    Ok(Json(state.registry.view(id)?))
}

async fn hint(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HintResponse>, ApiError> {
    let hint = state.registry.with_ready(id, |session| session.hint())?;
    Ok(Json(HintResponse { hint }))
}

async fn score(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let summary = state
        .registry
        .with_ready(id, |session| Ok(session.study().score_summary()))?;
    Ok(Json(summary.into()))
}

async fn restart(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .registry
        .with_ready(id, |session| session.study_mut().restart())?;
    Ok(Json(state.registry.view(id)?))
}

async fn retry_incorrect(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .registry
        .with_ready(id, |session| session.retry_incorrect())?;
    Ok(Json(state.registry.view(id)?))
}

async fn end_session(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}
