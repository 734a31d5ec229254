use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;
use uuid::Uuid;
use vocab_api::{ApiState, router, study::TimerFired};
use vocab_study::{FeedbackDelays, InMemoryRepository, StudyConfig, VocabularyEntry};

pub const ANIMALS: &[(&str, &str)] = &[
    ("cat", "mèo"),
    ("dog", "chó"),
    ("bird", "chim"),
    ("fish", "cá"),
];

/// Delays long enough that only an explicit advance moves a session on.
pub const MANUAL_DELAYS: FeedbackDelays = FeedbackDelays {
    learn_correct_ms: 60_000,
    learn_incorrect_ms: 60_000,
    comprehensive_ms: 60_000,
};

pub struct TestApp {
    pub state: ApiState,
    pub repo: InMemoryRepository,
    pub client: TestClient,
    pub timers: UnboundedReceiver<TimerFired>,
}

pub struct TestAppBuilder {
    study: StudyConfig,
    max_sessions: usize,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            study: StudyConfig {
                feedback: MANUAL_DELAYS,
                ..StudyConfig::default()
            },
            max_sessions: 100,
        }
    }

    pub fn delays(mut self, feedback: FeedbackDelays) -> Self {
        self.study.feedback = feedback;
        self
    }

    pub fn max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn build(self) -> TestApp {
        let repo = InMemoryRepository::new();
        let (state, timers) =
            ApiState::new(Arc::new(repo.clone()), self.study, self.max_sessions);
        let client = TestClient::new(router::router().with_state(state.clone()));
        TestApp {
            state,
            repo,
            client,
            timers,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn entries(pairs: &[(&str, &str)]) -> Vec<VocabularyEntry> {
    pairs
        .iter()
        .map(|(en, vi)| VocabularyEntry::new(*en, *vi))
        .collect()
}

/// The expected answer for a prompt, looked up in either direction.
pub fn answer_for(pairs: &[(&str, &str)], prompt: &str) -> String {
    pairs
        .iter()
        .find_map(|(en, vi)| {
            if *en == prompt {
                Some((*vi).to_string())
            } else if *vi == prompt {
                Some((*en).to_string())
            } else {
                None
            }
        })
        .expect("prompt belongs to the set")
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Start a session and return its id.
    pub async fn start(&self, set_id: Uuid, kind: &str, body: serde_json::Value) -> Uuid {
        let response = self.post_json(&format!("/sets/{set_id}/{kind}"), &body).await;
        response.assert_status(StatusCode::CREATED);
        let view: serde_json::Value = response.json();
        view["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("session id in view")
    }

    pub async fn view(&self, id: Uuid) -> serde_json::Value {
        let response = self.get(&format!("/sessions/{id}")).await;
        response.assert_status(StatusCode::OK);
        response.json()
    }

    pub async fn answer(&self, id: Uuid, text: &str) -> TestResponse {
        self.post_json(
            &format!("/sessions/{id}/answer"),
            &serde_json::json!({ "text": text }),
        )
        .await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }

    /// Assert an error response of the given status and kind.
    pub fn assert_error(&self, expected: StatusCode, kind: &str) {
        self.assert_status(expected);
        let body: serde_json::Value = self.json();
        assert_eq!(body["error"], kind, "Body: {}", self.text());
    }
}
