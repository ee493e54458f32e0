use thiserror::Error;

/// Failures obtaining a raw response from the inference endpoint.
///
/// These pass through the query cache untouched and are never cached.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("inference request could not be built: {0}")]
    Request(String),

    #[error("inference request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("inference request timed out")]
    Timeout,

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("inference response contained no choices")]
    EmptyResponse,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(err)
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;
