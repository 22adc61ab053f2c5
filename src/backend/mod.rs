//! Hosted-backend query client
//!
//! The relational backend is an external collaborator reached over its
//! REST interface: table-oriented `select`/`insert`/`update` plus session
//! authentication. Records are treated as opaque `serde_json::Value`s; the
//! backend's schema and row-level policies own their consistency.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::{Backend, HttpBackend};
pub use config::BackendConfig;
pub use error::BackendError;
pub use types::{AuthMode, AuthUser, Filter, FilterOp, Profile};
