//! High-level completion client: free-form text or strict JSON
//!
//! Wraps a [`ChatProvider`] with the two shapes the handlers need:
//! `generate_text` is a single attempt, `generate_json` retries a bounded
//! number of times and parses the content strictly. Rate-limited attempts
//! back off linearly before the next try; other failures retry without a
//! deliberate delay.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::error::LlmError;
use super::provider::ChatProvider;
use super::types::{ChatMessage, ChatRequest, ResponseFormat};

/// Attempts made by [`LlmClient::generate_json`] before giving up.
const MAX_JSON_ATTEMPTS: u32 = 3;

/// Per-call generation overrides
///
/// Unset fields fall back to the provider's defaults (`temperature`,
/// `max_tokens`) or to the client's configured model.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Randomness (0.0-2.0, higher = more random)
    pub temperature: Option<f32>,
    /// Output token cap
    pub max_tokens: Option<u32>,
    /// Model identifier override
    pub model: Option<String>,
}

impl GenerateOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Override the model for this call
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Completion client shared by the request handlers
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn ChatProvider>,
    /// Model used when the call site does not override it
    model: String,
    /// Base wait after a rate-limited attempt; attempt N waits N times this
    backoff_base: Duration,
}

impl LlmClient {
    /// Create a client around a provider with a default model
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            backoff_base: Duration::from_millis(2000),
        }
    }

    /// Set the base backoff wait (tests shrink this)
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    fn build_request(
        &self,
        prompt: &str,
        system: &str,
        options: &GenerateOptions,
        json: bool,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        ChatRequest {
            model: options.model.clone().unwrap_or_else(|| self.model.clone()),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: json.then(ResponseFormat::json_object),
        }
    }

    /// Obtain free-form text from the model
    ///
    /// Single request, no retry. Returns the first choice's content, or an
    /// empty string when the completion carries none.
    pub async fn generate_text(
        &self,
        prompt: &str,
        system: &str,
        options: GenerateOptions,
    ) -> Result<String, LlmError> {
        let request = self.build_request(prompt, system, &options, false);
        let completion = self.provider.complete(request).await?;
        Ok(completion.first_content().unwrap_or_default().to_string())
    }

    /// Obtain strict JSON from the model, parsed into `T`
    ///
    /// Up to three attempts. An empty completion or unparseable content
    /// counts as a failed attempt. A rate-limited attempt waits
    /// `backoff_base * attempt_number` before the next one; other failures
    /// are logged and retried immediately. After the last attempt the most
    /// recent error propagates.
    ///
    /// The parsed value is whatever the model produced: no shape validation
    /// happens beyond deserialization into `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        options: GenerateOptions,
    ) -> Result<T, LlmError> {
        let request = self.build_request(prompt, system, &options, true);
        let mut last_error: Option<LlmError> = None;

        for attempt in 1..=MAX_JSON_ATTEMPTS {
            match self.provider.complete(request.clone()).await {
                Ok(completion) => match completion.first_content() {
                    Some(content) if !content.trim().is_empty() => {
                        match serde_json::from_str::<T>(content) {
                            Ok(value) => return Ok(value),
                            Err(e) => {
                                tracing::warn!(attempt, error = %e, "completion was not valid JSON");
                                last_error = Some(e.into());
                            }
                        }
                    }
                    _ => {
                        tracing::warn!(attempt, "completion carried no content");
                        last_error = Some(LlmError::EmptyCompletion);
                    }
                },
                Err(e) if e.is_rate_limit() => {
                    tracing::warn!(attempt, "chat endpoint rate limited");
                    last_error = Some(e);
                    if attempt < MAX_JSON_ATTEMPTS {
                        tokio::time::sleep(self.backoff_base * attempt).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "chat completion failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::EmptyCompletion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatCompletion;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Instant;

    fn completion_with(content: &str) -> ChatCompletion {
        serde_json::from_str(&format!(
            r#"{{"choices":[{{"message":{{"content":{}}}}}]}}"#,
            serde_json::to_string(content).unwrap()
        ))
        .unwrap()
    }

    /// Provider that replays a fixed script of responses
    struct ScriptedProvider {
        script: Mutex<Vec<Result<ChatCompletion, LlmError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<ChatCompletion, LlmError>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatCompletion, LlmError> {
            *self.calls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                return Err(LlmError::EmptyCompletion);
            }
            script.remove(0)
        }
    }

    fn client_with(script: Vec<Result<ChatCompletion, LlmError>>) -> (LlmClient, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(script));
        let client = LlmClient::new(provider.clone(), "test-model")
            .with_backoff_base(Duration::from_millis(50));
        (client, provider)
    }

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Payload {
        answer: String,
    }

    #[tokio::test]
    async fn test_generate_text_returns_first_choice() {
        let (client, provider) = client_with(vec![Ok(completion_with("hello there"))]);
        let text = client
            .generate_text("hi", "", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(text, "hello there");
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_generate_text_empty_choices_yields_empty_string() {
        let empty: ChatCompletion = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        let (client, _) = client_with(vec![Ok(empty)]);
        let text = client
            .generate_text("hi", "", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_generate_text_does_not_retry() {
        let (client, provider) = client_with(vec![Err(LlmError::HttpError {
            status: 500,
            body: "boom".to_string(),
        })]);
        let result = client
            .generate_text("hi", "", GenerateOptions::new())
            .await;
        assert!(result.is_err());
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_generate_json_first_success_does_not_wait() {
        let (client, provider) = client_with(vec![Ok(completion_with(r#"{"answer":"yes"}"#))]);
        let started = Instant::now();
        let parsed: Payload = client
            .generate_json("q", "sys", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(parsed.answer, "yes");
        assert_eq!(*provider.calls.lock().unwrap(), 1);
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_generate_json_backs_off_after_rate_limit() {
        let (client, provider) = client_with(vec![
            Err(LlmError::RateLimited("slow down".to_string())),
            Ok(completion_with(r#"{"answer":"eventually"}"#)),
        ]);
        let started = Instant::now();
        let parsed: Payload = client
            .generate_json("q", "sys", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(parsed.answer, "eventually");
        assert_eq!(*provider.calls.lock().unwrap(), 2);
        // Attempt one failed rate-limited, so the client waited at least
        // one backoff base before attempt two.
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_generate_json_other_failures_do_not_back_off() {
        let (client, provider) = client_with(vec![
            Err(LlmError::HttpError {
                status: 500,
                body: "boom".to_string(),
            }),
            Err(LlmError::EmptyCompletion),
            Err(LlmError::HttpError {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        ]);
        let client = client.with_backoff_base(Duration::from_secs(5));
        let started = Instant::now();
        let result: Result<Payload, _> = client
            .generate_json("q", "sys", GenerateOptions::new())
            .await;
        assert!(result.is_err());
        assert_eq!(*provider.calls.lock().unwrap(), 3);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_generate_json_exhaustion_propagates_last_error() {
        let (client, provider) = client_with(vec![
            Ok(completion_with("")),
            Ok(completion_with("not json at all")),
            Err(LlmError::HttpError {
                status: 503,
                body: "unavailable".to_string(),
            }),
        ]);
        let result: Result<Payload, _> = client
            .generate_json("q", "sys", GenerateOptions::new())
            .await;
        match result {
            Err(LlmError::HttpError { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected the last error to propagate, got {:?}", other.err()),
        }
        assert_eq!(*provider.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_generate_json_unparseable_content_is_retried() {
        let (client, provider) = client_with(vec![
            Ok(completion_with("not json")),
            Ok(completion_with(r#"{"answer":"second try"}"#)),
        ]);
        let parsed: Payload = client
            .generate_json("q", "sys", GenerateOptions::new())
            .await
            .unwrap();
        assert_eq!(parsed.answer, "second try");
        assert_eq!(*provider.calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_build_request_includes_system_and_format() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let client = LlmClient::new(provider, "default-model");
        let request = client.build_request(
            "question",
            "instructions",
            &GenerateOptions::new().with_temperature(0.3),
            true,
        );
        assert_eq!(request.model, "default-model");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.response_format.is_some());
    }

    #[test]
    fn test_build_request_model_override() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let client = LlmClient::new(provider, "default-model");
        let request = client.build_request(
            "question",
            "",
            &GenerateOptions::new().with_model("bigger-model"),
            false,
        );
        assert_eq!(request.model, "bigger-model");
        assert_eq!(request.messages.len(), 1);
        assert!(request.response_format.is_none());
    }
}
