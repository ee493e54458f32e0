//! Long-polling runner for local development, where no public webhook URL exists.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::client::{BotClient, ChatSender};
use super::dispatch::{ReplyMode, answer_update};
use super::error::TelegramResult;
use super::types::Update;
use crate::constants::{
    DEFAULT_POLLING_PROMPT_LIMIT, POLLING_RETRY_DELAY_SECS, POLLING_TIMEOUT_SECS,
};
use crate::inference::InferenceTransport;
use crate::relay::Relay;

#[async_trait]
/// Source of pending updates (`getUpdates`).
pub trait UpdateSource: Send + Sync {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> TelegramResult<Vec<Update>>;
}

#[async_trait]
impl UpdateSource for BotClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> TelegramResult<Vec<Update>> {
        BotClient::get_updates(self, offset, timeout_secs).await
    }
}

#[derive(Debug, Clone)]
pub struct PollingOptions {
    pub prompt_limit: usize,
    pub timeout_secs: u64,
    /// Pause after a failed poll.
    pub retry_delay: Duration,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            prompt_limit: DEFAULT_POLLING_PROMPT_LIMIT,
            timeout_secs: POLLING_TIMEOUT_SECS,
            retry_delay: Duration::from_secs(POLLING_RETRY_DELAY_SECS),
        }
    }
}

/// Polls for updates and answers them one at a time until `shutdown` resolves.
///
/// Each message gets a "Thinking..." placeholder that is edited into the reply. Poll and
/// delivery failures are logged and never stop the loop.
pub async fn run_polling<T, C, F>(
    relay: &Relay<T>,
    client: &C,
    options: PollingOptions,
    shutdown: F,
) where
    T: InferenceTransport,
    C: UpdateSource + ChatSender,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;

    info!(prompt_limit = options.prompt_limit, "polling for updates");

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            polled = client.get_updates(offset, options.timeout_secs) => polled,
        };

        let updates = match polled {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(options.retry_delay) => continue,
                }
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            if let Err(e) = answer_update(
                relay,
                client,
                &update,
                ReplyMode::Placeholder,
                options.prompt_limit,
            )
            .await
            {
                warn!(update_id = update.update_id, error = %e, "failed to deliver reply");
            }
        }
    }

    info!("polling stopped");
}
