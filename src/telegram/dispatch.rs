//! Turns one incoming update into chat replies.

use tracing::{debug, warn};

use super::client::ChatSender;
use super::error::TelegramResult;
use super::types::Update;
use crate::constants::{
    EMPTY_REPLY, FAILURE_REPLY, GREETING_REPLY, MAX_MESSAGE_CHARS, THINKING_REPLY,
};
use crate::inference::{InferenceTransport, TransportError};
use crate::relay::{Relay, truncate_prompt};

/// How the reply reaches the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    /// One `sendMessage` once the reply is ready.
    Direct,
    /// A placeholder message first, edited in place with the reply.
    Placeholder,
}

/// What [`answer_update`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a text message, an unsupported command, or an empty prompt.
    Ignored,
    Greeted,
    Answered,
    /// The model could not be reached; the failure text was sent instead.
    Failed,
}

/// Renders a relay result as message text Telegram will accept.
pub fn outgoing_text(result: &Result<String, TransportError>) -> String {
    match result {
        Ok(reply) if reply.is_empty() => EMPTY_REPLY.to_string(),
        Ok(reply) => reply.chars().take(MAX_MESSAGE_CHARS).collect(),
        Err(_) => FAILURE_REPLY.to_string(),
    }
}

/// Answers a single update.
///
/// `/start` gets the greeting, other commands are ignored, and any other text is truncated to
/// `prompt_limit` characters and sent through the relay. Errors are Telegram delivery failures
/// only; model failures are reported to the user as [`FAILURE_REPLY`].
pub async fn answer_update<T, S>(
    relay: &Relay<T>,
    sender: &S,
    update: &Update,
    mode: ReplyMode,
    prompt_limit: usize,
) -> TelegramResult<Dispatch>
where
    T: InferenceTransport,
    S: ChatSender + ?Sized,
{
    let Some(message) = update.message.as_ref() else {
        return Ok(Dispatch::Ignored);
    };
    let Some(text) = message.text.as_deref() else {
        return Ok(Dispatch::Ignored);
    };
    let chat_id = message.chat.id;

    match message.command() {
        Some("start") => {
            sender.send_message(chat_id, GREETING_REPLY).await?;
            return Ok(Dispatch::Greeted);
        }
        Some(command) => {
            debug!(update_id = update.update_id, command, "ignoring command");
            return Ok(Dispatch::Ignored);
        }
        None => {}
    }

    let prompt = truncate_prompt(text, prompt_limit);
    if prompt.is_empty() {
        return Ok(Dispatch::Ignored);
    }

    let result = match mode {
        ReplyMode::Direct => {
            let result = relay.ask(&prompt).await;
            sender.send_message(chat_id, &outgoing_text(&result)).await?;
            result
        }
        ReplyMode::Placeholder => {
            let placeholder = sender.send_message(chat_id, THINKING_REPLY).await?;
            let result = relay.ask(&prompt).await;
            sender
                .edit_message_text(chat_id, placeholder.message_id, &outgoing_text(&result))
                .await?;
            result
        }
    };

    match result {
        Ok(_) => Ok(Dispatch::Answered),
        Err(e) => {
            warn!(update_id = update.update_id, chat_id, error = %e, "sent failure reply");
            Ok(Dispatch::Failed)
        }
    }
}
