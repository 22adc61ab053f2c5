// POST /api/ai/speech handler

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use warp::http::StatusCode;
use warp::Reply;

use crate::models::TranscriptResponse;
use crate::state::AppState;

use super::{client_identifier, error_reply, internal_error, too_many_requests};

/// Raw audio in, transcript out. The audio body is forwarded to the
/// transcription provider with the caller's content type.
pub async fn speech_to_text_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    content_type: Option<String>,
    audio: Bytes,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let caller = client_identifier(forwarded_for, remote);
    if !state.ai_limiter.admit(&caller) {
        return Ok(too_many_requests());
    }

    if audio.is_empty() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            "Audio payload is required.",
        ));
    }

    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    match state.stt.transcribe(audio, &content_type).await {
        Ok(transcript) => Ok(warp::reply::with_status(
            warp::reply::json(&TranscriptResponse {
                transcript: transcript.text,
            }),
            StatusCode::OK,
        )
        .into_response()),
        Err(e) => {
            tracing::error!(error = %e, "transcription failed");
            Ok(internal_error())
        }
    }
}
