// Shared test doubles: in-memory backend, scripted chat provider, speech
// stubs, and state builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use uuid::Uuid;

use guardline::backend::{AuthMode, AuthUser, Backend, BackendError, Filter, FilterOp};
use guardline::config::AppConfig;
use guardline::llm::types::{ChatChoice, ChoiceMessage};
use guardline::llm::{ChatCompletion, ChatProvider, ChatRequest, LlmClient, LlmError};
use guardline::rate_limit::RateLimiter;
use guardline::speech::{
    AudioFormat, AudioStream, SpeechError, SpeechToText, TextToSpeech, Transcript,
};
use guardline::state::AppState;

/// In-memory stand-in for the hosted backend
pub struct MockBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    sessions: HashMap<String, AuthUser>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            sessions: HashMap::new(),
        }
    }

    /// Seed a table with rows
    pub fn with_table(self, name: &str, rows: Vec<Value>) -> Self {
        self.tables.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    /// Register a valid session token for a user
    pub fn with_session(mut self, token: &str, user_id: Uuid) -> Self {
        self.sessions.insert(
            token.to_string(),
            AuthUser {
                id: user_id,
                email: Some("ops@example.com".to_string()),
            },
        );
        self
    }

    /// Current rows of a table
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn matches(row: &Value, filters: &[Filter]) -> bool {
        filters.iter().all(|filter| {
            let field = row.get(&filter.column);
            let actual = match field {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => return false,
            };
            match filter.op {
                FilterOp::Eq => actual == filter.value,
                FilterOp::ILike => actual.to_lowercase() == filter.value.to_lowercase(),
            }
        })
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn authenticate(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        self.sessions
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::AuthError("session rejected".to_string()))
    }

    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        _auth: &AuthMode,
    ) -> Result<Vec<Value>, BackendError> {
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(table).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|row| Self::matches(row, filters))
            .collect())
    }

    async fn insert(
        &self,
        table: &str,
        record: &Value,
        _auth: &AuthMode,
    ) -> Result<Value, BackendError> {
        let mut row = record.clone();
        let needs_id = row.get("id").map_or(true, Value::is_null);
        if needs_id {
            if let Some(object) = row.as_object_mut() {
                object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            }
        }

        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: &Value,
        _auth: &AuthMode,
    ) -> Result<Value, BackendError> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();

        for row in rows.iter_mut() {
            if Self::matches(row, filters) {
                if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                    for (key, value) in changes {
                        target.insert(key.clone(), value.clone());
                    }
                }
                return Ok(row.clone());
            }
        }

        Err(BackendError::NotFoundError(format!(
            "no rows matched in {}",
            table
        )))
    }
}

/// Chat provider with fixed behavior
pub enum ScriptedChat {
    /// Every completion succeeds with this content
    Always(String),
    /// Every completion fails with a 500
    Failing,
}

impl ScriptedChat {
    pub fn replying(text: &str) -> Self {
        Self::Always(text.to_string())
    }
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatCompletion, LlmError> {
        match self {
            ScriptedChat::Always(text) => Ok(ChatCompletion {
                choices: vec![ChatChoice {
                    message: ChoiceMessage {
                        content: Some(text.clone()),
                    },
                    finish_reason: Some("stop".to_string()),
                }],
            }),
            ScriptedChat::Failing => Err(LlmError::HttpError {
                status: 500,
                body: "provider down".to_string(),
            }),
        }
    }
}

/// Transcription stub returning a fixed transcript
pub struct StubStt {
    pub text: String,
}

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(
        &self,
        audio: Bytes,
        _content_type: &str,
    ) -> Result<Transcript, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidInput("empty audio payload".to_string()));
        }
        Ok(Transcript {
            text: self.text.clone(),
        })
    }
}

/// Synthesis stub streaming fixed bytes
pub struct StubTts {
    pub audio: Vec<u8>,
}

#[async_trait]
impl TextToSpeech for StubTts {
    async fn synthesize(&self, _text: &str) -> Result<AudioStream, SpeechError> {
        let chunks = vec![Ok(Bytes::from(self.audio.clone()))];
        Ok(AudioStream {
            format: AudioFormat::default(),
            body: Box::pin(futures::stream::iter(chunks)),
        })
    }
}

/// Configuration with test values for every required variable
pub fn test_config() -> AppConfig {
    let vars = HashMap::from([
        ("BACKEND_URL", "https://proj.backend.example"),
        ("BACKEND_ANON_KEY", "anon-key"),
        ("BACKEND_SERVICE_KEY", "service-key"),
        ("LLM_API_KEY", "llm-key"),
        ("SPEECH_API_KEY", "speech-key"),
        ("PUBLIC_BASE_URL", "https://www.guardline-security.com"),
    ]);
    AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

/// Application state over the test doubles with permissive rate limits
pub fn test_state(backend: Arc<MockBackend>, chat: ScriptedChat) -> Arc<AppState> {
    test_state_with_intake_limit(backend, chat, 100)
}

/// Same, but with an explicit intake ceiling for rate-limit tests
pub fn test_state_with_intake_limit(
    backend: Arc<MockBackend>,
    chat: ScriptedChat,
    intake_max: u32,
) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        intake_limiter: RateLimiter::new(intake_max, Duration::from_secs(60)),
        ai_limiter: RateLimiter::new(100, Duration::from_secs(60)),
        backend,
        llm: LlmClient::new(Arc::new(chat), "test-model")
            .with_backoff_base(Duration::from_millis(10)),
        stt: Arc::new(StubStt {
            text: "hello world".to_string(),
        }),
        tts: Arc::new(StubTts {
            audio: b"pcm-bytes".to_vec(),
        }),
    })
}
