// Route definitions and handlers

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

use crate::handlers;
use crate::state::AppState;

/// Inject shared state into a handler
fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Caller identity inputs: forwarded-for header and socket address
fn caller_identity() -> impl Filter<
    Extract = (Option<String>, Option<SocketAddr>),
    Error = warp::Rejection,
> + Clone {
    warp::header::optional::<String>("x-forwarded-for").and(warp::addr::remote())
}

pub fn configure_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = warp::path("api");

    // POST /api/ai/manager
    let manager_chat = api
        .and(warp::path("ai"))
        .and(warp::path("manager"))
        .and(warp::path::end())
        .and(warp::post())
        .and(caller_identity())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::manager_chat_handler);

    // POST /api/ai/speech
    let speech_to_text = api
        .and(warp::path("ai"))
        .and(warp::path("speech"))
        .and(warp::path::end())
        .and(warp::post())
        .and(caller_identity())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .and(with_state(state.clone()))
        .and_then(handlers::speech_to_text_handler);

    // POST /api/ai/tts
    let text_to_speech = api
        .and(warp::path("ai"))
        .and(warp::path("tts"))
        .and(warp::path::end())
        .and(warp::post())
        .and(caller_identity())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::text_to_speech_handler);

    // POST /api/service-requests
    let create_service_request = api
        .and(warp::path("service-requests"))
        .and(warp::path::end())
        .and(warp::post())
        .and(caller_identity())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::create_service_request_handler);

    // PATCH /api/service-requests
    let update_service_request = api
        .and(warp::path("service-requests"))
        .and(warp::path::end())
        .and(warp::patch())
        .and(caller_identity())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::update_service_request_handler);

    // POST /api/inquiries
    let create_inquiry = api
        .and(warp::path("inquiries"))
        .and(warp::path::end())
        .and(warp::post())
        .and(caller_identity())
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::create_inquiry_handler);

    // GET /api/profile
    let get_profile = api
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_state(state.clone()))
        .and_then(handlers::profile_handler);

    // GET /robots.txt
    let robots = warp::path("robots.txt")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::robots_txt_handler);

    // Combine routes
    manager_chat
        .or(speech_to_text)
        .or(text_to_speech)
        .or(create_service_request)
        .or(update_service_request)
        .or(create_inquiry)
        .or(get_profile)
        .or(robots)
}
