//! LLM client layer
//!
//! This module provides a thin adapter over a hosted chat-completion
//! endpoint: free-form text for the conversational surface and strictly
//! parsed JSON for structured outputs, with bounded retry around the
//! latter.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use client::{GenerateOptions, LlmClient};
pub use error::LlmError;
pub use provider::{ChatProvider, HttpChatProvider};
pub use types::{ChatCompletion, ChatMessage, ChatRequest, ChatRole, ResponseFormat};
