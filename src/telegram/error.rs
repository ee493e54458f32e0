use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network failure. The request URL (which embeds the bot token) is stripped.
    #[error("telegram request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("telegram API error {code:?}: {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("telegram response for {method} had no result")]
    MissingResult { method: &'static str },
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        TelegramError::Http(err.without_url())
    }
}

pub type TelegramResult<T> = Result<T, TelegramError>;
