//! Environment-driven application configuration

use std::time::Duration;

use thiserror::Error;

use crate::backend::BackendConfig;

/// Errors raised while assembling configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Ceiling and interval for one rate-limiter instance
#[derive(Debug, Clone, Copy)]
pub struct RateSettings {
    pub max_tokens: u32,
    pub interval: Duration,
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the server binds on
    pub port: u16,

    /// Public site origin, advertised in the crawling policy
    pub public_base_url: String,

    /// Hosted-backend endpoints and keys
    pub backend: BackendConfig,

    /// Chat-completion endpoint base URL
    pub llm_base_url: String,
    /// Chat-completion bearer key
    pub llm_api_key: String,
    /// Default completion model
    pub llm_model: String,

    /// Speech provider base URL (transcription and synthesis)
    pub speech_base_url: String,
    /// Speech provider key
    pub speech_api_key: String,
    /// Transcription model
    pub stt_model: String,
    /// Synthesis voice model
    pub tts_voice: String,

    /// Ceiling for public intake endpoints
    pub intake_rate: RateSettings,
    /// Ceiling for AI endpoints
    pub ai_rate: RateSettings,
}

impl AppConfig {
    /// Assemble configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Assemble configuration from an arbitrary lookup. Tests drive this
    /// with a map instead of mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };
        let optional =
            |name: &'static str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let backend = BackendConfig::new(
            required("BACKEND_URL")?,
            required("BACKEND_ANON_KEY")?,
            required("BACKEND_SERVICE_KEY")?,
        )
        .map_err(|e| ConfigError::InvalidVar {
            name: "BACKEND_URL",
            value: e.to_string(),
        })?;

        Ok(Self {
            port: parse(&lookup, "PORT", 3030)?,
            public_base_url: optional("PUBLIC_BASE_URL", "https://www.guardline-security.com"),
            backend,
            llm_base_url: optional("LLM_BASE_URL", "https://api.groq.com/openai/v1"),
            llm_api_key: required("LLM_API_KEY")?,
            llm_model: optional("LLM_MODEL", "llama-3.3-70b-versatile"),
            speech_base_url: optional("SPEECH_BASE_URL", "https://api.deepgram.com"),
            speech_api_key: required("SPEECH_API_KEY")?,
            stt_model: optional("STT_MODEL", "nova-3"),
            tts_voice: optional("TTS_VOICE", "aura-2-thalia-en"),
            intake_rate: RateSettings {
                max_tokens: parse(&lookup, "INTAKE_RATE_MAX", 5)?,
                interval: Duration::from_millis(parse(&lookup, "INTAKE_RATE_INTERVAL_MS", 60_000)?),
            },
            ai_rate: RateSettings {
                max_tokens: parse(&lookup, "AI_RATE_MAX", 20)?,
                interval: Duration::from_millis(parse(&lookup, "AI_RATE_INTERVAL_MS", 60_000)?),
            },
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::InvalidVar {
            name,
            value: raw,
        }),
    }
}
