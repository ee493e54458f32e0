//! Inference transport: one chat-completion round trip per call.
//!
//! The transport does no normalization of its own. It hands back whatever shape the endpoint
//! produced as a [`RawResponse`] and leaves text extraction to [`crate::normalize`].

pub mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::normalize::RawResponse;

pub use client::HfRouterClient;
pub use error::{TransportError, TransportResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

#[async_trait]
/// Sends a single user prompt to a chat model.
pub trait InferenceTransport: Send + Sync {
    /// Runs one completion and returns the unnormalized reply message.
    async fn complete(&self, model: &str, prompt: &str) -> TransportResult<RawResponse>;
}
