use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;
use vocab_api::jobs;
use vocab_study::FeedbackDelays;

use crate::common::{ANIMALS, TestAppBuilder, answer_for, entries};

#[tokio::test]
async fn test_health_check() {
    let app = TestAppBuilder::new().build();
    app.client
        .get("/health")
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestAppBuilder::new().build();
    app.client
        .get("/nowhere")
        .await
        .assert_error(StatusCode::NOT_FOUND, "not_found");
}

#[tokio::test]
async fn test_unknown_set_is_not_found() {
    let app = TestAppBuilder::new().build();
    app.client
        .post_json(&format!("/sets/{}/learn", Uuid::new_v4()), &json!({}))
        .await
        .assert_error(StatusCode::NOT_FOUND, "set_not_found");
    assert!(app.state.registry.is_empty());
}

#[tokio::test]
async fn test_empty_set_is_insufficient() {
    let app = TestAppBuilder::new().build();
    let set_id = app.repo.insert_set(Vec::new());

    let response = app
        .client
        .post_json(&format!("/sets/{set_id}/comprehensive"), &json!({}))
        .await;
    response.assert_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_data");
    let body: Value = response.json();
    assert_eq!(body["retryable"], false);
}

#[tokio::test]
async fn test_unknown_session() {
    let app = TestAppBuilder::new().build();
    let id = Uuid::new_v4();
    app.client
        .get(&format!("/sessions/{id}"))
        .await
        .assert_error(StatusCode::NOT_FOUND, "session_not_found");
    app.client
        .answer(id, "mèo")
        .await
        .assert_error(StatusCode::NOT_FOUND, "session_not_found");
}

#[tokio::test]
async fn test_failed_load_can_be_reloaded() {
    let app = TestAppBuilder::new().build();
    let set_id = app.repo.insert_set(entries(ANIMALS));
    app.repo.set_offline(true);

    let response = app
        .client
        .post_json(&format!("/sets/{set_id}/learn"), &json!({}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let view: Value = response.json();
    assert_eq!(view["status"], "failed");
    assert_eq!(view["error"]["error"], "repository_unavailable");
    assert_eq!(view["error"]["retryable"], true);
    let id = view["id"].as_str().expect("id").to_string();

    app.client
        .answer(id.parse().expect("uuid"), "mèo")
        .await
        .assert_error(StatusCode::BAD_GATEWAY, "repository_unavailable");

    // still offline: the slot stays failed
    let response = app.client.post(&format!("/sessions/{id}/reload")).await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "failed");

    app.repo.set_offline(false);
    let response = app.client.post(&format!("/sessions/{id}/reload")).await;
    response.assert_status(StatusCode::OK);
    let view: Value = response.json();
    assert_eq!(view["status"], "ready");
    assert_eq!(view["phase"], "quiz1");

    app.client
        .post(&format!("/sessions/{id}/reload"))
        .await
        .assert_error(StatusCode::CONFLICT, "not_reloadable");
}

#[tokio::test]
async fn test_session_limit() {
    let app = TestAppBuilder::new().max_sessions(1).build();
    let set_id = app.repo.insert_set(entries(ANIMALS));
    app.client.start(set_id, "learn", json!({})).await;

    let response = app
        .client
        .post_json(&format!("/sets/{set_id}/learn"), &json!({}))
        .await;
    response.assert_error(StatusCode::SERVICE_UNAVAILABLE, "capacity");
}

#[tokio::test]
async fn test_delete_tears_session_down() {
    let app = TestAppBuilder::new().build();
    let set_id = app.repo.insert_set(entries(ANIMALS));
    let id = app.client.start(set_id, "comprehensive", json!({})).await;

    app.client
        .delete(&format!("/sessions/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.client
        .get(&format!("/sessions/{id}"))
        .await
        .assert_error(StatusCode::NOT_FOUND, "session_not_found");
    app.client
        .delete(&format!("/sessions/{id}"))
        .await
        .assert_error(StatusCode::NOT_FOUND, "session_not_found");
}

#[tokio::test]
async fn test_feedback_times_out_on_its_own() {
    let app = TestAppBuilder::new()
        .delays(FeedbackDelays {
            learn_correct_ms: 20,
            learn_incorrect_ms: 20,
            comprehensive_ms: 20,
        })
        .build();
    let dispatcher = tokio::spawn(jobs::dispatch_timers(
        app.state.registry.clone(),
        app.timers,
    ));

    let set_id = app.repo.insert_set(entries(ANIMALS));
    let id = app
        .client
        .start(set_id, "learn", json!({ "mode": "quiz_only" }))
        .await;

    let view = app.client.view(id).await;
    let prompt = view["question"]["prompt"].as_str().expect("prompt");
    app.client
        .answer(id, &answer_for(ANIMALS, prompt))
        .await
        .assert_status(StatusCode::OK);

    let mut advanced = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let view = app.client.view(id).await;
        if view["feedback"].is_null() {
            assert_eq!(view["progress"]["index"], 1);
            advanced = true;
            break;
        }
    }
    assert!(advanced, "feedback never timed out");

    dispatcher.abort();
}

#[tokio::test]
async fn test_idle_sessions_are_swept() {
    let app = TestAppBuilder::new().build();
    let set_id = app.repo.insert_set(entries(ANIMALS));
    let id = app.client.start(set_id, "learn", json!({})).await;

    assert_eq!(app.state.registry.sweep_idle(Duration::from_secs(3600)), 0);
    assert_eq!(app.state.registry.sweep_idle(Duration::ZERO), 1);
    app.client
        .get(&format!("/sessions/{id}"))
        .await
        .assert_error(StatusCode::NOT_FOUND, "session_not_found");
}

#[tokio::test]
async fn test_polling_the_view_keeps_a_session_alive() {
    let app = TestAppBuilder::new().build();
    let set_id = app.repo.insert_set(entries(ANIMALS));
    let id = app.client.start(set_id, "learn", json!({})).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    app.client.view(id).await;

    assert_eq!(app.state.registry.sweep_idle(Duration::from_millis(40)), 0);
    assert_eq!(app.client.view(id).await["status"], "ready");
}
