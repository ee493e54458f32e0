//! Scripted transport for tests and local runs without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::InferenceTransport;
use super::error::TransportResult;
use crate::normalize::RawResponse;

/// Returns queued responses in order, then echoes `Mock response for: {prompt}`.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<TransportResult<RawResponse>>>,
    prompts: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fixed latency to every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues the next response (or failure).
    pub fn push(&self, response: TransportResult<RawResponse>) {
        self.script.lock().push_back(response);
    }

    /// Returns the number of `complete` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns every `(model, prompt)` pair received, oldest first.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl InferenceTransport for MockTransport {
    async fn complete(&self, model: &str, prompt: &str) -> TransportResult<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .push((model.to_string(), prompt.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().pop_front();
        scripted.unwrap_or_else(|| {
            Ok(RawResponse::from(serde_json::json!({
                "role": "assistant",
                "content": format!("Mock response for: {prompt}"),
            })))
        })
    }
}
