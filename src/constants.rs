//! Cross-cutting, shared constants.
//!
//! Defaults for the environment-backed [`Config`](crate::config::Config) live here so the
//! relay, the gateway and the polling runner agree on them.

/// Default max number of cached replies.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Default chat model served by the inference router.
pub const DEFAULT_MODEL: &str = "google/gemma-2-2b-it:nebius";

/// Default OpenAI-compatible inference base URL.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Prompt character limit applied to webhook updates.
pub const DEFAULT_WEBHOOK_PROMPT_LIMIT: usize = 800;

/// Prompt character limit applied to long-polling updates.
pub const DEFAULT_POLLING_PROMPT_LIMIT: usize = 1000;

/// Long-poll timeout passed to `getUpdates`.
pub const POLLING_TIMEOUT_SECS: u64 = 30;

/// User-visible reply when the model cannot be reached.
pub const FAILURE_REPLY: &str = "Sorry, I couldn't reach the model right now.";

/// Placeholder sent while the model is generating (polling mode).
pub const THINKING_REPLY: &str = "Thinking...";

/// Reply to `/start`.
pub const GREETING_REPLY: &str = "Hello! Send me a message and I'll pass it to the model.";

/// Sent instead of an empty model reply, which Telegram would reject.
pub const EMPTY_REPLY: &str = "The model returned an empty reply.";

/// Telegram's maximum text length for a single message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Pause after a failed `getUpdates` call before polling again.
pub const POLLING_RETRY_DELAY_SECS: u64 = 5;
