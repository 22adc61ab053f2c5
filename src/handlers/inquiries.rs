// POST /api/inquiries handler

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use warp::http::StatusCode;
use warp::Reply;

use crate::backend::AuthMode;
use crate::models::InquiryPayload;
use crate::state::AppState;

use super::{client_identifier, error_reply, internal_error, too_many_requests};

/// Public contact form. The visitor has no session, so the insert goes
/// through the elevated-privilege client; the table accepts nothing else
/// from the outside.
pub async fn create_inquiry_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    payload: InquiryPayload,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let caller = client_identifier(forwarded_for, remote);
    if !state.intake_limiter.admit(&caller) {
        return Ok(too_many_requests());
    }

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            &format!("Missing required fields: {}", missing.join(", ")),
        ));
    }

    let record = json!({
        "name": payload.name,
        "email": payload.email,
        "phone": payload.phone,
        "message": payload.message,
    });

    match state
        .backend
        .insert("contact_inquiries", &record, &AuthMode::Service)
        .await
    {
        Ok(stored) => {
            Ok(warp::reply::with_status(warp::reply::json(&stored), StatusCode::OK)
                .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "contact inquiry insert failed");
            Ok(internal_error())
        }
    }
}
