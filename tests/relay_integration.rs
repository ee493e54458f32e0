//! End-to-end tests over real HTTP: a fake inference router and a fake Bot API server on
//! loopback ports, driven through the public API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::IntoResponse,
    routing::post,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::ServiceExt;

use relay::gateway::{HandlerState, create_router_with_state};
use relay::telegram::{PollingOptions, run_polling};
use relay::{
    BotClient, ChatSender, FAILURE_REPLY, HfRouterClient, QueryCacheHandle, Relay, TelegramError,
    TransportError,
};

const TOKEN: &str = "123:TEST";
const MODEL: &str = "google/gemma-2-2b-it:nebius";

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    edited: Arc<Notify>,
}

/// Completions endpoint replying with `reply` as the message content, or 503 when `None`.
async fn fake_router(reply: Option<&'static str>) -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    rec.requests.lock().push((auth, body.clone()));

                    match reply {
                        Some(content) => Json(json!({
                            "id": "chatcmpl-1",
                            "object": "chat.completion",
                            "created": 1_700_000_000,
                            "model": body["model"],
                            "choices": [{
                                "index": 0,
                                "message": { "role": "assistant", "content": content },
                                "finish_reason": "stop"
                            }]
                        }))
                        .into_response(),
                        None => (StatusCode::SERVICE_UNAVAILABLE, "model is loading").into_response(),
                    }
                },
            ),
        )
        .with_state(recorded.clone());
    (format!("{}/v1", spawn(app).await), recorded)
}

/// Bot API server for `TOKEN`: hands out `updates` once, then empty long polls.
async fn fake_telegram(updates: Vec<Value>) -> (String, Recorded) {
    let recorded = Recorded::default();
    let pending = Arc::new(Mutex::new(Some(updates)));

    let send = |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
        rec.requests.lock().push(("sendMessage".to_string(), body.clone()));
        if body["chat_id"] == json!(-1) {
            return Json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            }));
        }
        Json(json!({
            "ok": true,
            "result": {
                "message_id": 500,
                "chat": { "id": body["chat_id"], "type": "private" },
                "text": body["text"]
            }
        }))
    };

    let edit = |State(rec): State<Recorded>, Json(body): Json<Value>| async move {
        rec.requests.lock().push(("editMessageText".to_string(), body));
        rec.edited.notify_one();
        Json(json!({ "ok": true, "result": true }))
    };

    let get_updates = move |State(rec): State<Recorded>, Json(body): Json<Value>| {
        let pending = Arc::clone(&pending);
        async move {
            rec.requests.lock().push(("getUpdates".to_string(), body));
            let batch = pending.lock().take();
            let result = match batch {
                Some(updates) => updates,
                None => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Vec::new()
                }
            };
            Json(json!({ "ok": true, "result": result }))
        }
    };

    let app = Router::new()
        .route(&format!("/bot{TOKEN}/sendMessage"), post(send))
        .route(&format!("/bot{TOKEN}/editMessageText"), post(edit))
        .route(&format!("/bot{TOKEN}/getUpdates"), post(get_updates))
        .with_state(recorded.clone());
    (spawn(app).await, recorded)
}

fn http_relay(base_url: &str) -> Relay<HfRouterClient> {
    let client = HfRouterClient::new(base_url, "hf-test", Duration::from_secs(5)).unwrap();
    Relay::new(QueryCacheHandle::with_capacity(16), client, MODEL)
}

fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "chat": { "id": chat_id, "type": "private" },
            "text": text
        }
    })
}

#[tokio::test]
async fn test_router_client_round_trip() {
    let (base_url, router) = fake_router(Some("```\n'Four.'\n```")).await;
    let relay = http_relay(&base_url);

    assert_eq!(relay.ask("What is 2+2?").await.unwrap(), "Four.");
    assert_eq!(relay.ask("What is 2+2?").await.unwrap(), "Four.");

    let requests = router.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth, "Bearer hf-test");
    assert_eq!(body["model"], json!(MODEL));
    assert_eq!(body["messages"][0]["role"], json!("user"));
    assert_eq!(body["messages"][0]["content"], json!("What is 2+2?"));
}

#[tokio::test]
async fn test_router_client_status_error() {
    let (base_url, _router) = fake_router(None).await;
    let relay = http_relay(&base_url);

    let err = relay.ask("hello").await.unwrap_err();
    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "model is loading");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(relay.cache().is_empty());
}

#[tokio::test]
async fn test_bot_client_api_error() {
    let (api_url, _telegram) = fake_telegram(Vec::new()).await;
    let bot = BotClient::with_api_url(&api_url, TOKEN).unwrap();

    let sent = bot.send_message(42, "hi").await.unwrap();
    assert_eq!(sent.message_id, 500);
    assert_eq!(sent.chat.id, 42);

    let err = bot.send_message(-1, "hi").await.unwrap_err();
    assert!(matches!(err, TelegramError::Api { code: Some(400), .. }));
    assert!(!err.to_string().contains(TOKEN));
}

#[tokio::test]
async fn test_webhook_end_to_end() {
    let (base_url, _router) = fake_router(Some("  Hello  from   the model  ")).await;
    let (api_url, telegram) = fake_telegram(Vec::new()).await;

    let relay = Arc::new(http_relay(&base_url));
    let bot = Arc::new(BotClient::with_api_url(&api_url, TOKEN).unwrap());
    let app = create_router_with_state(HandlerState::new(relay, bot, 800));

    let response = app
        .oneshot(
            Request::post("/telegram_webhook")
                .header("content-type", "application/json")
                .body(Body::from(text_update(1, 42, "hi").to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = telegram.requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "sendMessage");
    assert_eq!(requests[0].1["chat_id"], json!(42));
    assert_eq!(requests[0].1["text"], json!("Hello from the model"));
}

#[tokio::test]
async fn test_webhook_end_to_end_model_down() {
    let (base_url, _router) = fake_router(None).await;
    let (api_url, telegram) = fake_telegram(Vec::new()).await;

    let relay = Arc::new(http_relay(&base_url));
    let bot = Arc::new(BotClient::with_api_url(&api_url, TOKEN).unwrap());
    let app = create_router_with_state(HandlerState::new(relay, bot, 800));

    app.oneshot(
        Request::post("/telegram_webhook")
            .header("content-type", "application/json")
            .body(Body::from(text_update(2, 7, "are you there").to_string()))
            .unwrap(),
    )
    .await
    .unwrap();

    let requests = telegram.requests.lock().clone();
    assert_eq!(requests[0].1["text"], json!(FAILURE_REPLY));
}

#[tokio::test]
async fn test_polling_end_to_end() {
    let (base_url, _router) = fake_router(Some("Pong.")).await;
    let (api_url, telegram) = fake_telegram(vec![text_update(41, 9, "ping")]).await;

    let relay = http_relay(&base_url);
    let bot = BotClient::with_api_url(&api_url, TOKEN).unwrap();
    let edited = Arc::clone(&telegram.edited);
    let options = PollingOptions {
        timeout_secs: 0,
        ..PollingOptions::default()
    };

    tokio::time::timeout(
        Duration::from_secs(10),
        run_polling(&relay, &bot, options, async move { edited.notified().await }),
    )
    .await
    .expect("polling should stop after the reply is edited in");

    let requests = telegram.requests.lock().clone();
    let calls: Vec<&str> = requests.iter().map(|(method, _)| method.as_str()).collect();
    assert_eq!(calls[..3], ["getUpdates", "sendMessage", "editMessageText"]);

    assert_eq!(requests[1].1["text"], json!("Thinking..."));
    assert_eq!(requests[2].1["message_id"], json!(500));
    assert_eq!(requests[2].1["text"], json!("Pong."));
}
