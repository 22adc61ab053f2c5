// POST /api/ai/tts handler

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::http::StatusCode;

use crate::models::TtsRequest;
use crate::state::AppState;

use super::{client_identifier, error_reply, internal_error, too_many_requests};

/// Text in, audio out. The provider's body is re-emitted chunk by chunk,
/// preserving its chunked delivery; headers describe the PCM format so the
/// client can play the stream as it arrives.
pub async fn text_to_speech_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    request: TtsRequest,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let caller = client_identifier(forwarded_for, remote);
    if !state.ai_limiter.admit(&caller) {
        return Ok(too_many_requests());
    }

    if request.text.trim().is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Text is required."));
    }

    let audio = match state.tts.synthesize(request.text.trim()).await {
        Ok(audio) => audio,
        Err(e) => {
            tracing::error!(error = %e, "speech synthesis failed");
            return Ok(internal_error());
        }
    };

    let format = audio.format;
    let mut response = warp::reply::Reply::into_response(warp::reply::stream(audio.body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        "Content-Type",
        warp::http::HeaderValue::from_static("audio/pcm"),
    );
    headers.insert(
        "X-Sample-Rate",
        warp::http::HeaderValue::from_str(&format.sample_rate.to_string()).unwrap(),
    );
    headers.insert(
        "X-Channels",
        warp::http::HeaderValue::from_str(&format.channels.to_string()).unwrap(),
    );
    headers.insert(
        "X-Bit-Depth",
        warp::http::HeaderValue::from_str(&format.bit_depth.to_string()).unwrap(),
    );
    headers.insert(
        "Cache-Control",
        warp::http::HeaderValue::from_static("no-cache"),
    );
    Ok(response)
}
