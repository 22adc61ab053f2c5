//! Error types for the LLM layer

use thiserror::Error;

/// Errors that can occur when talking to the chat-completion provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// The provider rejected the request for quota reasons
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    /// The completion carried no usable content
    #[error("empty completion")]
    EmptyCompletion,

    /// JSON encoding/decoding issues
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LlmError {
    /// Whether this error indicates provider-side rate limiting.
    ///
    /// Covers both the dedicated variant and HTTP failures whose status or
    /// body carries the provider's `rate_limit_exceeded` marker.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            LlmError::RateLimited(_) => true,
            LlmError::HttpError { status, body } => {
                *status == 429 || body.contains("rate_limit_exceeded")
            }
            _ => false,
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            LlmError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            LlmError::HttpError {
                status: 0,
                body: err.to_string(),
            }
        }
    }
}
