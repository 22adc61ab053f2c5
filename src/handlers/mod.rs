//! HTTP request handlers
//!
//! Every handler follows the same shape: extract the caller identifier,
//! consult the rate limiter, authenticate where required, validate
//! required fields, perform one backend or provider call, and map the
//! outcome to a response with an explicit status code. A failure at any
//! step returns immediately; there are no multi-step transactions.

mod inquiries;
mod manager;
mod profile;
mod robots;
mod service_requests;
mod speech;
mod tts;

pub use inquiries::create_inquiry_handler;
pub use manager::manager_chat_handler;
pub use profile::profile_handler;
pub use robots::robots_txt_handler;
pub use service_requests::{create_service_request_handler, update_service_request_handler};
pub use speech::speech_to_text_handler;
pub use tts::text_to_speech_handler;

use std::net::SocketAddr;

use warp::http::StatusCode;
use warp::Reply;

use crate::backend::{AuthMode, Backend, BackendError, Filter, Profile};
use crate::models::{ErrorResponse, GENERIC_FAILURE_MESSAGE, RATE_LIMIT_MESSAGE};

/// JSON error body with an explicit status
pub(crate) fn error_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse::new(message)), status)
        .into_response()
}

pub(crate) fn too_many_requests() -> warp::reply::Response {
    error_reply(StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE)
}

pub(crate) fn internal_error() -> warp::reply::Response {
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_MESSAGE)
}

/// Identifier the rate limiter keys on: the first `x-forwarded-for` hop
/// when the service sits behind a proxy, else the socket address.
pub(crate) fn client_identifier(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
) -> String {
    if let Some(header) = forwarded_for {
        if let Some(first) = header.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Session token from an `Authorization: Bearer ...` header
pub(crate) fn bearer_token(header: Option<String>) -> Option<String> {
    let header = header?;
    let token = header.strip_prefix("Bearer ").or_else(|| header.strip_prefix("bearer "))?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve a session token to the caller's profile row.
///
/// `Ok(None)` means the session is valid but no profile exists, which
/// handlers surface as 404.
pub(crate) async fn resolve_profile(
    backend: &dyn Backend,
    token: &str,
) -> Result<Option<Profile>, BackendError> {
    let user = backend.authenticate(token).await?;
    let rows = backend
        .select(
            "profiles",
            &[Filter::eq("id", user.id.to_string())],
            &AuthMode::Session(token.to_string()),
        )
        .await?;

    match rows.into_iter().next() {
        None => Ok(None),
        Some(row) => {
            let profile = serde_json::from_value::<Profile>(row)?;
            Ok(Some(profile))
        }
    }
}
