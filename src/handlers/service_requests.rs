// POST/PATCH /api/service-requests handlers

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::Reply;

use crate::backend::{AuthMode, Backend, BackendError, Filter};
use crate::llm::GenerateOptions;
use crate::models::{
    ServiceRequestPayload, ServiceRequestUpdate, RequestTriage, SERVICE_REQUEST_STATUSES,
    TRIAGE_PRIORITIES,
};
use crate::state::AppState;

use super::{bearer_token, client_identifier, error_reply, internal_error, too_many_requests};

const TRIAGE_SYSTEM_PROMPT: &str = "You are the intake triage assistant for a security services company. \
    Classify the urgency of the service request you are given. \
    Respond with a JSON object: {\"priority\": \"low\"|\"medium\"|\"high\", \"summary\": \"<one sentence>\"}.";

/// Public lead intake. Rate-limited; writes through the elevated-privilege
/// client because the visitor has no session.
pub async fn create_service_request_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    payload: ServiceRequestPayload,
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

    // A recognized city routes the request to that branch; an unknown or
    // absent city leaves it unrouted for manual dispatch.
    let branch_id = match payload.location_city.as_deref() {
        Some(city) if !city.trim().is_empty() => {
            match find_branch(state.backend.as_ref(), city.trim()).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(error = %e, "branch lookup failed, storing request unrouted");
                    None
                }
            }
        }
        _ => None,
    };

    let record = json!({
        "customer_name": payload.customer_name,
        "customer_email": payload.customer_email,
        "customer_phone": payload.customer_phone,
        "service_type": payload.service_type,
        "location_address": payload.location_address,
        "location_city": payload.location_city,
        "details": payload.details,
        "branch_id": branch_id,
        "status": "pending",
    });

    let stored = match state
        .backend
        .insert("service_requests", &record, &AuthMode::Service)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            tracing::error!(error = %e, "service request insert failed");
            return Ok(internal_error());
        }
    };

    // Best-effort AI triage; the request is already stored, so any failure
    // here is logged and the untagged record is returned as-is.
    let stored = triage_request(&state, stored).await;

    Ok(warp::reply::with_status(warp::reply::json(&stored), StatusCode::OK).into_response())
}

/// Status update from the operations dashboard. Requires a session; the
/// backend's row-level policies decide which rows the caller may touch.
pub async fn update_service_request_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    authorization: Option<String>,
    payload: ServiceRequestUpdate,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let caller = client_identifier(forwarded_for, remote);
    if !state.intake_limiter.admit(&caller) {
        return Ok(too_many_requests());
    }

    let Some(token) = bearer_token(authorization) else {
        return Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            "Authentication required.",
        ));
    };
    if let Err(e) = state.backend.authenticate(&token).await {
        tracing::warn!(error = %e, "service request update with invalid session");
        return Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            "Authentication required.",
        ));
    }

    let Some(id) = payload.id else {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Missing required fields: id",
        ));
    };
    let status = payload.status.as_deref().unwrap_or_default();
    if !SERVICE_REQUEST_STATUSES.contains(&status) {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid status."));
    }

    let patch = json!({
        "status": status,
        "updated_at": Utc::now().to_rfc3339(),
    });

    match state
        .backend
        .update(
            "service_requests",
            &[Filter::eq("id", id.to_string())],
            &patch,
            &AuthMode::Session(token),
        )
        .await
    {
        Ok(updated) => {
            Ok(warp::reply::with_status(warp::reply::json(&updated), StatusCode::OK)
                .into_response())
        }
        Err(BackendError::NotFoundError(_)) => Ok(error_reply(
            StatusCode::NOT_FOUND,
            "Service request not found.",
        )),
        Err(e) => {
            tracing::error!(error = %e, "service request update failed");
            Ok(internal_error())
        }
    }
}

/// Case-insensitive branch lookup by city
async fn find_branch(backend: &dyn Backend, city: &str) -> Result<Option<Uuid>, BackendError> {
    let rows = backend
        .select("branches", &[Filter::ilike("city", city)], &AuthMode::Service)
        .await?;

    Ok(rows
        .first()
        .and_then(|row| row.get("id"))
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok()))
}

/// Ask the model for a priority and write it back onto the stored record.
/// Returns the annotated row, or the original when triage fails.
async fn triage_request(state: &AppState, stored: Value) -> Value {
    let Some(id) = stored.get("id").and_then(Value::as_str).map(str::to_string) else {
        return stored;
    };

    let triage: RequestTriage = match state
        .llm
        .generate_json(
            &stored.to_string(),
            TRIAGE_SYSTEM_PROMPT,
            GenerateOptions::new().with_temperature(0.2).with_max_tokens(256),
        )
        .await
    {
        Ok(triage) => triage,
        Err(e) => {
            tracing::warn!(error = %e, "triage generation failed");
            return stored;
        }
    };

    if !TRIAGE_PRIORITIES.contains(&triage.priority.as_str()) {
        tracing::warn!(priority = %triage.priority, "triage returned an unknown priority");
        return stored;
    }

    match state
        .backend
        .update(
            "service_requests",
            &[Filter::eq("id", id)],
            &json!({ "priority": triage.priority }),
            &AuthMode::Service,
        )
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            tracing::warn!(error = %e, "failed to store triage priority");
            stored
        }
    }
}
