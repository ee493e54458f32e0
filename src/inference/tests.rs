use super::client::{HfRouterClient, decode_completion};
use super::error::TransportError;
use super::{InferenceTransport, MockTransport};
use crate::normalize::{RawResponse, extract_text, normalize};
use std::time::Duration;

fn typed_body(content: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": "google/gemma-2-2b-it",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 3, "completion_tokens": 5, "total_tokens": 8 }
    }))
    .unwrap()
}

#[test]
fn test_decode_typed_completion_yields_accessor() {
    let raw = decode_completion(&typed_body("Bonjour")).unwrap();
    assert!(matches!(raw, RawResponse::Accessor(_)));
    assert_eq!(extract_text(&raw), "Bonjour");
}

fn typed_body_with_message(message: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "chatcmpl-456",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": "google/gemma-2-2b-it",
        "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }]
    }))
    .unwrap()
}

#[test]
fn test_typed_null_content_normalizes_to_empty() {
    let body = typed_body_with_message(serde_json::json!({ "role": "assistant", "content": null }));
    let raw = decode_completion(&body).unwrap();
    assert!(matches!(raw, RawResponse::Accessor(_)));
    assert_eq!(extract_text(&raw), "");
    assert_eq!(normalize(&raw), "");
}

#[test]
fn test_typed_refusal_used_when_content_missing() {
    let body = typed_body_with_message(serde_json::json!({
        "role": "assistant",
        "content": null,
        "refusal": "I can't help with that."
    }));
    let raw = decode_completion(&body).unwrap();
    assert_eq!(normalize(&raw), "I can't help with that.");
}

#[test]
fn test_decode_loose_completion_yields_record() {
    let body = br#"{"choices":[{"message":{"content":"loose","extra":{"x":1}}}]}"#;
    let raw = decode_completion(body).unwrap();
    assert!(matches!(raw, RawResponse::Record(_)));
    assert_eq!(extract_text(&raw), "loose");
}

#[test]
fn test_decode_choice_without_message_keeps_choice() {
    let body = br#"{"choices":[{"text":"legacy completion"}]}"#;
    let raw = decode_completion(body).unwrap();
    assert!(matches!(raw, RawResponse::Record(_)));
}

#[test]
fn test_decode_body_without_choices_passes_through() {
    let raw = decode_completion(br#"{"content":"direct"}"#).unwrap();
    assert_eq!(extract_text(&raw), "direct");

    let raw = decode_completion(br#""just a string""#).unwrap();
    assert!(matches!(raw, RawResponse::Text(_)));
}

#[test]
fn test_decode_empty_choices_is_error() {
    let err = decode_completion(br#"{"choices":[]}"#).unwrap_err();
    assert!(matches!(err, TransportError::EmptyResponse));
}

#[test]
fn test_decode_invalid_json_is_malformed() {
    let err = decode_completion(b"<html>bad gateway</html>").unwrap_err();
    assert!(matches!(err, TransportError::Malformed(_)));
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn test_endpoint_trims_trailing_slash() {
    let client = HfRouterClient::new("http://localhost:9000/v1/", "t", Duration::from_secs(1))
        .expect("client should build");
    assert_eq!(client.endpoint(), "http://localhost:9000/v1/chat/completions");
}

#[test]
fn test_debug_hides_token() {
    let client = HfRouterClient::new("http://localhost", "hf_secret", Duration::from_secs(1))
        .expect("client should build");
    assert!(!format!("{client:?}").contains("hf_secret"));
}

#[test]
fn test_status_error_message() {
    let err = TransportError::Status {
        status: 503,
        body: "overloaded".to_string(),
    };
    assert_eq!(err.to_string(), "inference endpoint returned 503: overloaded");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = HfRouterClient::new("http://127.0.0.1:1", "t", Duration::from_secs(2))
        .expect("client should build");
    let err = client.complete("m", "hello").await.unwrap_err();
    assert!(matches!(
        err,
        TransportError::Http(_) | TransportError::Timeout
    ));
}

#[tokio::test]
async fn test_mock_transport_script_then_echo() {
    let mock = MockTransport::new();
    mock.push(Err(TransportError::Timeout));

    let first = mock.complete("m", "first").await;
    assert!(matches!(first, Err(TransportError::Timeout)));

    let second = mock.complete("m", "second").await.unwrap();
    assert_eq!(extract_text(&second), "Mock response for: second");

    assert_eq!(mock.calls(), 2);
    assert_eq!(
        mock.prompts(),
        vec![
            ("m".to_string(), "first".to_string()),
            ("m".to_string(), "second".to_string())
        ]
    );
}
