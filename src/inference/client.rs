//! OpenAI-compatible chat-completions client (Hugging Face router by default).

use std::time::Duration;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    ChatCompletionResponseMessage, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::InferenceTransport;
use super::error::{TransportError, TransportResult};
use crate::config::Config;
use crate::constants::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::normalize::{RawResponse, ResponseAccessor};

/// Max bytes of an error body kept in [`TransportError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

/// Chat-completions transport for an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct HfRouterClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl HfRouterClient {
    /// Creates a client for `base_url` (e.g. `https://router.huggingface.co/v1`).
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Builds a client from [`Config`]; a missing token is sent as an empty bearer.
    pub fn from_config(config: &Config) -> TransportResult<Self> {
        Self::new(
            &config.base_url,
            config.hf_token.clone().unwrap_or_default(),
            config.request_timeout,
        )
    }

    /// Returns the completions endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(model: &str, prompt: &str) -> TransportResult<CreateChatCompletionRequest> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages([ChatCompletionRequestMessage::User(message)])
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))
    }
}

impl Default for HfRouterClient {
    fn default() -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            base_url: DEFAULT_BASE_URL.to_string(),
            token: String::new(),
        }
    }
}

impl std::fmt::Debug for HfRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfRouterClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl InferenceTransport for HfRouterClient {
    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.chars().count()))]
    async fn complete(&self, model: &str, prompt: &str) -> TransportResult<RawResponse> {
        let request = Self::build_request(model, prompt)?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = truncate_body(&String::from_utf8_lossy(&body));
            warn!(status = status.as_u16(), "inference endpoint returned an error");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(bytes = body.len(), "inference response received");
        decode_completion(&body)
    }
}

/// Decodes a completion body into the first choice's message.
///
/// A body matching the OpenAI schema yields a typed accessor. Anything else is kept as loose
/// JSON: `choices[0].message` when present, otherwise the whole body.
pub fn decode_completion(body: &[u8]) -> TransportResult<RawResponse> {
    let value: Value = serde_json::from_slice(body)?;

    if let Ok(typed) = serde_json::from_value::<CreateChatCompletionResponse>(value.clone()) {
        return match typed.choices.into_iter().next() {
            Some(choice) => Ok(RawResponse::accessor(choice.message)),
            None => Err(TransportError::EmptyResponse),
        };
    }

    debug!("completion body does not match the typed schema, decoding loosely");
    match value.get("choices").and_then(Value::as_array) {
        Some(choices) => {
            let first = choices.first().ok_or(TransportError::EmptyResponse)?;
            let message = first.get("message").unwrap_or(first);
            Ok(RawResponse::from(message.clone()))
        }
        None => Ok(RawResponse::from(value)),
    }
}

/// The `content` field always exists on this type; a null one reads as JSON `null`.
impl ResponseAccessor for ChatCompletionResponseMessage {
    fn content(&self) -> Option<RawResponse> {
        let content = self
            .content
            .clone()
            .or_else(|| self.refusal.clone())
            .map_or(RawResponse::Unknown(Value::Null), RawResponse::Text);
        Some(content)
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
