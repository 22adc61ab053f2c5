//! Speech-to-text client

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;

use super::error::SpeechError;

/// A recognized transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
}

/// Interface the speech handler is written against
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe raw audio bytes tagged with their content type.
    async fn transcribe(&self, audio: Bytes, content_type: &str) -> Result<Transcript, SpeechError>;
}

/// Provider response: channels of ranked alternatives
///
/// Only the first alternative of the first channel is consumed.
#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: Option<ListenResults>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    #[serde(default)]
    channels: Vec<ListenChannel>,
}

#[derive(Debug, Deserialize)]
struct ListenChannel {
    #[serde(default)]
    alternatives: Vec<ListenAlternative>,
}

#[derive(Debug, Deserialize)]
struct ListenAlternative {
    #[serde(default)]
    transcript: String,
}

/// Extract the best transcript from a provider response body
fn transcript_from_response(body: &str) -> Result<Transcript, SpeechError> {
    let parsed = serde_json::from_str::<ListenResponse>(body)?;
    let text = parsed
        .results
        .and_then(|r| r.channels.into_iter().next())
        .and_then(|c| c.alternatives.into_iter().next())
        .map(|a| a.transcript)
        .unwrap_or_default();
    Ok(Transcript { text })
}

/// Client for the hosted transcription endpoint
pub struct HttpSttClient {
    /// HTTP client for making requests
    http_client: Client,
    base_url: String,
    api_key: String,
    /// Transcription model identifier
    model: String,
    /// Transcription language code
    language: String,
}

impl HttpSttClient {
    /// Create a new transcription client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, SpeechError> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| SpeechError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            language: "en".to_string(),
        })
    }

    /// Build the transcription endpoint URL with model/formatting/language
    /// selection
    fn listen_url(&self) -> String {
        format!(
            "{}/v1/listen?model={}&smart_format=true&language={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.language
        )
    }
}

#[async_trait]
impl SpeechToText for HttpSttClient {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
    ) -> Result<Transcript, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput("empty audio payload".to_string()));
        }

        let response = self
            .http_client
            .post(self.listen_url())
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", content_type)
            .body(audio)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_else(|_| String::new());
        if !status.is_success() {
            return Err(SpeechError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        transcript_from_response(&body)
    }
}
