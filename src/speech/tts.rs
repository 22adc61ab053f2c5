//! Text-to-speech client
//!
//! The provider streams raw PCM; the handler re-emits that body to the
//! browser chunk by chunk, so nothing here buffers the audio.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::json;
use std::pin::Pin;

use super::error::SpeechError;

/// PCM format of a synthesized stream, surfaced to the caller as headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl Default for AudioFormat {
    fn default() -> Self {
        // Linear16 mono at 24kHz, the provider's native synthesis format.
        Self {
            sample_rate: 24_000,
            channels: 1,
            bit_depth: 16,
        }
    }
}

/// A synthesized audio body plus its format metadata
pub struct AudioStream {
    pub format: AudioFormat,
    pub body: Pin<Box<dyn Stream<Item = Result<Bytes, SpeechError>> + Send + Sync>>,
}

/// Interface the TTS handler is written against
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text` into a streamed audio body.
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SpeechError>;
}

/// Client for the hosted synthesis endpoint
pub struct HttpTtsClient {
    /// HTTP client for making requests
    http_client: Client,
    base_url: String,
    api_key: String,
    /// Voice model identifier
    voice: String,
    format: AudioFormat,
}

impl HttpTtsClient {
    /// Create a new synthesis client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        voice: impl Into<String>,
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
            voice: voice.into(),
            format: AudioFormat::default(),
        })
    }

    /// Build the synthesis endpoint URL selecting voice, PCM encoding, and
    /// sample rate
    fn speak_url(&self) -> String {
        format!(
            "{}/v1/speak?model={}&encoding=linear16&sample_rate={}",
            self.base_url.trim_end_matches('/'),
            self.voice,
            self.format.sample_rate
        )
    }
}

#[async_trait]
impl TextToSpeech for HttpTtsClient {
    async fn synthesize(&self, text: &str) -> Result<AudioStream, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::InvalidInput("empty text".to_string()));
        }

        let response = self
            .http_client
            .post(self.speak_url())
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({ "text": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(SpeechError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| SpeechError::StreamError(e.to_string())));

        Ok(AudioStream {
            format: self.format,
            body: Box::pin(body),
        })
    }
}
