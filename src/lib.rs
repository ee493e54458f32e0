//! Telegram-to-LLM relay library (used by the `hf-relay` binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core
//! - [`extract_text`], [`clean_text`], [`normalize`] - turn any model reply shape into text
//! - [`QueryCache`], [`QueryCacheHandle`] - FIFO-bounded prompt cache with `get_or_compute`
//! - [`Relay`] - cache + transport + normalizer
//!
//! ## Collaborators
//! - [`InferenceTransport`], [`HfRouterClient`] - OpenAI-compatible chat completions
//! - [`BotClient`], [`ChatSender`] - Telegram Bot API
//! - [`gateway`] - webhook HTTP server
//! - [`telegram::run_polling`] - long-polling runner
//!
//! ## Configuration
//! - [`Config`], [`ConfigError`] - environment-backed settings
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod inference;
pub mod normalize;
pub mod relay;
pub mod telegram;

pub use cache::{CacheKey, CacheStats, CacheStatus, QueryCache, QueryCacheHandle};
pub use config::{Config, ConfigError};
pub use constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_MODEL, FAILURE_REPLY};
pub use hashing::hash_query;
#[cfg(any(test, feature = "mock"))]
pub use inference::MockTransport;
pub use inference::{HfRouterClient, InferenceTransport, TransportError, TransportResult};
pub use normalize::{RawResponse, ResponseAccessor, clean_text, extract_text, normalize};
pub use relay::{Relay, truncate_prompt};
#[cfg(any(test, feature = "mock"))]
pub use telegram::RecordingSender;
pub use telegram::{BotClient, ChatSender, TelegramError, Update};
