//! Router-level tests for the webhook gateway.

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::cache::QueryCacheHandle;
use crate::constants::{FAILURE_REPLY, GREETING_REPLY};
use crate::gateway::create_router_with_state;
use crate::gateway::state::HandlerState;
use crate::inference::{MockTransport, TransportError};
use crate::relay::Relay;
use crate::telegram::{RecordingSender, SentMessage};

const TEST_MODEL: &str = "handler-test-model";

struct Harness {
    app: Router,
    relay: Arc<Relay<MockTransport>>,
    sender: Arc<RecordingSender>,
}

fn harness_with(mock: MockTransport, prompt_limit: usize) -> Harness {
    let relay = Arc::new(Relay::new(
        QueryCacheHandle::with_capacity(8),
        mock,
        TEST_MODEL,
    ));
    let sender = Arc::new(RecordingSender::new());
    let state = HandlerState::new(Arc::clone(&relay), Arc::clone(&sender), prompt_limit);
    Harness {
        app: create_router_with_state(state),
        relay,
        sender,
    }
}

fn harness() -> Harness {
    harness_with(MockTransport::new(), 800)
}

fn webhook_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/telegram_webhook")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn text_update(chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1001,
        "message": {
            "message_id": 55,
            "chat": { "id": chat_id, "type": "private" },
            "text": text,
        }
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = harness()
        .app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_webhook_relays_text_message() {
    let h = harness();
    let response = h
        .app
        .oneshot(webhook_request(text_update(77, "hello there").to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
    assert_eq!(
        h.sender.sent(),
        vec![SentMessage::Send {
            chat_id: 77,
            text: "Mock response for: hello there".to_string(),
        }]
    );
    assert_eq!(h.relay.cache().len(), 1);
}

#[tokio::test]
async fn test_webhook_repeated_prompt_hits_cache() {
    let h = harness();
    for _ in 0..2 {
        let response = h
            .app
            .clone()
            .oneshot(webhook_request(text_update(1, "same question").to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(h.relay.transport().calls(), 1);
    assert_eq!(h.sender.sent().len(), 2);
    assert_eq!(h.relay.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_webhook_truncates_prompt() {
    let h = harness_with(MockTransport::new(), 5);
    h.app
        .oneshot(webhook_request(text_update(1, "  0123456789  ").to_string()))
        .await
        .unwrap();

    assert_eq!(h.relay.transport().prompts()[0].1, "01234");
}

#[tokio::test]
async fn test_webhook_model_failure_still_acknowledged() {
    let mock = MockTransport::new();
    mock.push(Err(TransportError::Status {
        status: 503,
        body: "overloaded".to_string(),
    }));
    let h = harness_with(mock, 800);

    let response = h
        .app
        .oneshot(webhook_request(text_update(5, "anyone there?").to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
    assert_eq!(h.sender.sent()[0].text(), FAILURE_REPLY);
    assert!(h.relay.cache().is_empty());
}

#[tokio::test]
async fn test_webhook_send_failure_is_swallowed() {
    let h = harness();
    h.sender.fail_all();

    let response = h
        .app
        .oneshot(webhook_request(text_update(5, "hi").to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn test_webhook_start_command() {
    let h = harness();
    h.app
        .oneshot(webhook_request(text_update(3, "/start").to_string()))
        .await
        .unwrap();

    assert_eq!(h.sender.sent()[0].text(), GREETING_REPLY);
    assert_eq!(h.relay.transport().calls(), 0);
}

#[tokio::test]
async fn test_webhook_ignores_non_text_updates() {
    let h = harness();
    let update = json!({
        "update_id": 9,
        "message": {
            "message_id": 1,
            "chat": { "id": 3, "type": "private" },
            "photo": [],
        }
    });

    let response = h
        .app
        .oneshot(webhook_request(update.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(h.sender.sent().is_empty());
    assert_eq!(h.relay.transport().calls(), 0);
}

#[tokio::test]
async fn test_webhook_rejects_malformed_body() {
    let h = harness();
    let response = h
        .app
        .oneshot(webhook_request("{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["code"], json!(400));
    assert!(body["error"].as_str().unwrap().starts_with("invalid update"));
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_route() {
    let response = harness()
        .app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
