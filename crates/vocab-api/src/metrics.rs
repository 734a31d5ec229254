//! Prometheus metrics for HTTP traffic, study activity and repository access.

use std::{sync::LazyLock, time::Instant};

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;
use vocab_study::QuestionKind;

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("uuid pattern is valid")
});
static NUMBER_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\d+").expect("number pattern is valid")
});

/// Install the Prometheus recorder.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full("repository_query_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Middleware recording request count and latency per normalized path.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .record(duration);

    response
}

/// Replace ids in a path so each route maps to one label value.
fn normalize_path(path: &str) -> String {
    let normalized = UUID_SEGMENT.replace_all(path, ":id");
    NUMBER_SEGMENT.replace_all(&normalized, "/:id").into_owned()
}

async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (StatusCode::OK, handle.render())
}

/// `GET /metrics`, carrying its own state.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(handle)
}

pub fn record_repository_query(query_name: &'static str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        "repository_queries_total",
        "query" => query_name,
        "status" => status
    )
    .increment(1);

    histogram!(
        "repository_query_duration_seconds",
        "query" => query_name
    )
    .record(duration_secs);
}

pub fn record_session_started(mode: &'static str) {
    counter!("study_sessions_started_total", "mode" => mode).increment(1);
}

pub fn record_answer(kind: QuestionKind, is_correct: bool) {
    let result = if is_correct { "correct" } else { "incorrect" };

    counter!(
        "study_answers_total",
        "kind" => kind.as_str(),
        "result" => result
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/sessions/550e8400-e29b-41d4-a716-446655440000"),
            "/sessions/:id"
        );
        assert_eq!(
            normalize_path("/sets/550e8400-e29b-41d4-a716-446655440000/learn"),
            "/sets/:id/learn"
        );
        assert_eq!(normalize_path("/items/42"), "/items/:id");
        assert_eq!(normalize_path("/health"), "/health");
    }
}
