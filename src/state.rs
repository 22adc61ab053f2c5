//! Shared application state handed to request handlers

use std::sync::Arc;

use thiserror::Error;

use crate::backend::{Backend, HttpBackend};
use crate::config::AppConfig;
use crate::llm::{HttpChatProvider, LlmClient};
use crate::rate_limit::RateLimiter;
use crate::speech::{HttpSttClient, HttpTtsClient, SpeechToText, TextToSpeech};

/// Errors raised while wiring up outbound clients at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend client: {0}")]
    Backend(#[from] crate::backend::BackendError),

    #[error("llm client: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("speech client: {0}")]
    Speech(#[from] crate::speech::SpeechError),
}

/// Everything a handler needs, shared behind one `Arc`
pub struct AppState {
    pub config: AppConfig,
    /// Gates the public intake endpoints
    pub intake_limiter: RateLimiter,
    /// Gates the AI endpoints
    pub ai_limiter: RateLimiter,
    pub backend: Arc<dyn Backend>,
    pub llm: LlmClient,
    pub stt: Arc<dyn SpeechToText>,
    pub tts: Arc<dyn TextToSpeech>,
}

impl AppState {
    /// Build production state: HTTP clients for every collaborator
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let backend = Arc::new(HttpBackend::new(config.backend.clone())?);
        let provider = Arc::new(HttpChatProvider::new(
            config.llm_base_url.clone(),
            config.llm_api_key.clone(),
        )?);
        let llm = LlmClient::new(provider, config.llm_model.clone());
        let stt = Arc::new(HttpSttClient::new(
            config.speech_base_url.clone(),
            config.speech_api_key.clone(),
            config.stt_model.clone(),
        )?);
        let tts = Arc::new(HttpTtsClient::new(
            config.speech_base_url.clone(),
            config.speech_api_key.clone(),
            config.tts_voice.clone(),
        )?);

        Ok(Self {
            intake_limiter: RateLimiter::new(
                config.intake_rate.max_tokens,
                config.intake_rate.interval,
            ),
            ai_limiter: RateLimiter::new(config.ai_rate.max_tokens, config.ai_rate.interval),
            backend,
            llm,
            stt,
            tts,
            config,
        })
    }
}
