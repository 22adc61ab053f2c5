//! Provider trait and HTTP implementation for chat completions

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::types::{ChatCompletion, ChatRequest};

/// Interface the completion client is written against.
///
/// Production code uses [`HttpChatProvider`]; tests substitute scripted
/// doubles.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Issue one chat-completion request and return the full response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, LlmError>;
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct HttpChatProvider {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL up to and including the API version segment
    base_url: String,
    /// Bearer key for the provider
    api_key: String,
}

impl HttpChatProvider {
    /// Create a new provider client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Endpoint base, e.g. `https://api.groq.com/openai/v1`
    /// * `api_key` - Bearer key for the provider
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Build the completions endpoint URL
    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, LlmError> {
        let response = self
            .http_client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            if status.as_u16() == 429 || body.contains("rate_limit_exceeded") {
                return Err(LlmError::RateLimited(body));
            }
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let completion = serde_json::from_str::<ChatCompletion>(&body)?;
        Ok(completion)
    }
}
