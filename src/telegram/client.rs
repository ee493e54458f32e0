//! Telegram Bot API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::error::{TelegramError, TelegramResult};
use super::types::{ApiResponse, Message, Update};
use crate::constants::{DEFAULT_TELEGRAM_API_URL, POLLING_TIMEOUT_SECS};

/// Headroom on top of the long-poll timeout before the HTTP client gives up.
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 10;

#[async_trait]
/// Outbound half of a chat: what the relay needs to answer users.
pub trait ChatSender: Send + Sync {
    /// Sends a new text message and returns it.
    async fn send_message(&self, chat_id: i64, text: &str) -> TelegramResult<Message>;

    /// Replaces the text of a message the bot sent earlier.
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> TelegramResult<()>;
}

/// HTTP client bound to one bot token.
#[derive(Clone)]
pub struct BotClient {
    http: HttpClient,
    api_base: String,
}

impl BotClient {
    /// Creates a client against the public Bot API.
    pub fn new(token: &str) -> TelegramResult<Self> {
        Self::with_api_url(DEFAULT_TELEGRAM_API_URL, token)
    }

    /// Creates a client against a custom Bot API server.
    pub fn with_api_url(api_url: &str, token: &str) -> TelegramResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(
                POLLING_TIMEOUT_SECS + HTTP_TIMEOUT_MARGIN_SECS,
            ))
            .build()?;

        Ok(Self {
            http,
            api_base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// Long-polls for updates with ids at or above `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> TelegramResult<Vec<Update>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> TelegramResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_base, method);
        debug!(method, "telegram request");

        let response: ApiResponse<T> = self.http.post(url).json(body).send().await?.json().await?;

        if !response.ok {
            return Err(TelegramError::Api {
                code: response.error_code,
                description: response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        response
            .result
            .ok_or(TelegramError::MissingResult { method })
    }
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl ChatSender for BotClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> TelegramResult<Message> {
        self.call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> TelegramResult<()> {
        // Returns the edited Message, or `true` for inline messages.
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }
}
