//! Error types for backend operations

use thiserror::Error;

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Errors that can occur when querying the hosted backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Session token missing, expired, or rejected
    #[error("authentication error: {0}")]
    AuthError(String),

    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Row or record doesn't exist
    #[error("not found: {0}")]
    NotFoundError(String),

    /// Invalid input data
    #[error("validation error: {0}")]
    ValidationError(String),

    /// JSON encoding/decoding issues
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Backend unreachable or client construction failure
    #[error("connection error: {0}")]
    ConnectionError(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            BackendError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            BackendError::ConnectionError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::SerializationError(err.to_string())
    }
}

impl From<uuid::Error> for BackendError {
    fn from(err: uuid::Error) -> Self {
        BackendError::ValidationError(format!("Invalid UUID: {}", err))
    }
}
