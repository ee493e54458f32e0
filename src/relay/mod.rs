//! Prompt relay: cache lookup, transport call, normalization.
//!
//! A [`Relay`] is built once at startup and shared (behind an `Arc`) by the webhook gateway
//! and the polling runner.


use tracing::{error, info, instrument};

use crate::cache::{CacheKey, CacheStatus, QueryCacheHandle};
use crate::inference::{InferenceTransport, TransportError};
use crate::normalize::normalize;

/// Answers prompts for one model, memoizing normalized replies.
pub struct Relay<T> {
    cache: QueryCacheHandle,
    transport: T,
    model: String,
}

impl<T: InferenceTransport> Relay<T> {
    pub fn new(cache: QueryCacheHandle, transport: T, model: impl Into<String>) -> Self {
        Self {
            cache,
            transport,
            model: model.into(),
        }
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn cache(&self) -> &QueryCacheHandle {
        &self.cache
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the cleaned reply for `prompt`, from cache when possible.
    ///
    /// Transport failures are returned as-is and leave the cache unchanged.
    pub async fn ask(&self, prompt: &str) -> Result<String, TransportError> {
        self.ask_with_status(prompt).await.map(|(reply, _)| reply)
    }

    /// Like [`Relay::ask`], also reporting whether the reply came from the cache.
    #[instrument(skip(self, prompt), fields(model = %self.model, key_id = tracing::field::Empty))]
    pub async fn ask_with_status(
        &self,
        prompt: &str,
    ) -> Result<(String, CacheStatus), TransportError> {
        let key_id = CacheKey::new(self.model.as_str(), prompt).short_id();
        tracing::Span::current().record("key_id", key_id);

        let result = self
            .cache
            .get_or_compute_async(&self.model, prompt, || async {
                let raw = self.transport.complete(&self.model, prompt).await?;
                Ok(normalize(&raw))
            })
            .await;

        match &result {
            Ok((reply, status)) => {
                info!(status = %status, reply_chars = reply.chars().count(), "prompt answered");
            }
            Err(e) => {
                error!(error = %e, "error querying model");
            }
        }

        result
    }
}

impl<T> std::fmt::Debug for Relay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("model", &self.model)
            .field("cache", &self.cache)
            .finish()
    }
}

/// Trims `text` and keeps at most `limit` characters.
pub fn truncate_prompt(text: &str, limit: usize) -> String {
    text.trim().chars().take(limit).collect()
}
