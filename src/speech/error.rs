//! Error types for the speech layer

use thiserror::Error;

/// Errors that can occur when talking to the speech providers
#[derive(Debug, Error)]
pub enum SpeechError {
    /// HTTP request failures
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Streamed body failures mid-transfer
    #[error("stream error: {0}")]
    StreamError(String),

    /// JSON encoding/decoding issues
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Invalid request parameters
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SpeechError::HttpError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            SpeechError::HttpError {
                status: 0,
                body: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for SpeechError {
    fn from(err: serde_json::Error) -> Self {
        SpeechError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = SpeechError::HttpError {
            status: 502,
            body: "upstream".to_string(),
        };
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = SpeechError::InvalidInput("empty audio".to_string());
        assert!(err.to_string().contains("empty audio"));
    }
}
