//! Speech provider clients
//!
//! Speech-to-text and text-to-speech are external collaborators reached
//! over HTTPS. This module keeps both behind traits so the handlers can be
//! exercised without a provider.

pub mod error;
pub mod stt;
pub mod tts;

// Re-export commonly used types
pub use error::SpeechError;
pub use stt::{HttpSttClient, SpeechToText, Transcript};
pub use tts::{AudioFormat, AudioStream, HttpTtsClient, TextToSpeech};
