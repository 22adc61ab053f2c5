// GET /api/profile handler

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use crate::state::AppState;

use super::{bearer_token, error_reply, resolve_profile};

/// Current user's profile for the dashboard shell.
///
/// 401 when the session is missing or rejected, 404 when the session is
/// valid but no profile row exists.
pub async fn profile_handler(
    authorization: Option<String>,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let Some(token) = bearer_token(authorization) else {
        return Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            "Authentication required.",
        ));
    };

    match resolve_profile(state.backend.as_ref(), &token).await {
        Ok(Some(profile)) => {
            Ok(warp::reply::with_status(warp::reply::json(&profile), StatusCode::OK)
                .into_response())
        }
        Ok(None) => Ok(error_reply(StatusCode::NOT_FOUND, "Profile not found.")),
        Err(e) => {
            tracing::warn!(error = %e, "profile lookup with invalid session");
            Ok(error_reply(
                StatusCode::UNAUTHORIZED,
                "Authentication required.",
            ))
        }
    }
}
