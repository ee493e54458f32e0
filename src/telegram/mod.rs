//! Telegram Bot API: wire types, an HTTP client, update dispatch, and a polling runner.
//!
//! The webhook gateway and [`polling::run_polling`] both route updates through
//! [`answer_update`], differing only in [`ReplyMode`] and prompt limit.

pub mod client;
pub mod dispatch;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod polling;
pub mod types;


pub use client::{BotClient, ChatSender};
pub use dispatch::{Dispatch, ReplyMode, answer_update, outgoing_text};
pub use error::{TelegramError, TelegramResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::{RecordingSender, SentMessage};
pub use polling::{PollingOptions, UpdateSource, run_polling};
pub use types::{Chat, Message, Update, User};
