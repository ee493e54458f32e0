//! In-memory [`ChatSender`] that records what would have been sent.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::ChatSender;
use super::error::{TelegramError, TelegramResult};
use super::types::{Chat, Message};

/// One outbound Bot API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Send {
        chat_id: i64,
        text: String,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
}

impl SentMessage {
    pub fn text(&self) -> &str {
        match self {
            SentMessage::Send { text, .. } | SentMessage::Edit { text, .. } => text,
        }
    }
}

#[derive(Debug)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentMessage>>,
    next_id: AtomicI64,
    fail: AtomicBool,
}

impl Default for RecordingSender {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail: AtomicBool::new(false),
        }
    }
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call fail with an API error.
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    fn check(&self) -> TelegramResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TelegramError::Api {
                code: Some(400),
                description: "Bad Request: chat not found".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> TelegramResult<Message> {
        self.check()?;
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().push(SentMessage::Send {
            chat_id,
            text: text.to_string(),
        });
        Ok(Message {
            message_id,
            chat: Chat {
                id: chat_id,
                kind: Some("private".to_string()),
            },
            from: None,
            text: Some(text.to_string()),
        })
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> TelegramResult<()> {
        self.check()?;
        self.sent.lock().push(SentMessage::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
