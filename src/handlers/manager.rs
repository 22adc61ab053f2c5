// POST /api/ai/manager handler

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use warp::http::StatusCode;
use warp::Reply;

use crate::backend::Profile;
use crate::llm::GenerateOptions;
use crate::models::{
    ChatTurn, ManagerChatRequest, ManagerChatResponse, TurnRole, ASSISTANT_FALLBACK_MESSAGE,
};
use crate::state::AppState;

use super::{bearer_token, client_identifier, error_reply, resolve_profile, too_many_requests};

/// One chat turn with the manager assistant.
///
/// Requires a session and a profile row. Past the authentication gate,
/// every failure collapses into the in-band fallback reply with HTTP 200:
/// the conversational surface never shows raw error text. Full detail is
/// logged server-side.
pub async fn manager_chat_handler(
    forwarded_for: Option<String>,
    remote: Option<SocketAddr>,
    authorization: Option<String>,
    request: ManagerChatRequest,
    state: Arc<AppState>,
) -> Result<warp::reply::Response, Infallible> {
    let caller = client_identifier(forwarded_for, remote);
    if !state.ai_limiter.admit(&caller) {
        return Ok(too_many_requests());
    }

    let Some(token) = bearer_token(authorization) else {
        return Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            "Authentication required.",
        ));
    };

    let profile = match resolve_profile(state.backend.as_ref(), &token).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return Ok(error_reply(StatusCode::NOT_FOUND, "Profile not found.")),
        Err(e) => {
            tracing::warn!(error = %e, "manager chat with invalid session");
            return Ok(error_reply(
                StatusCode::UNAUTHORIZED,
                "Authentication required.",
            ));
        }
    };

    if request.message.trim().is_empty() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Message is required."));
    }

    let system = system_prompt(&profile);
    let prompt = render_conversation(&request.history, &request.message);

    let reply = match state
        .llm
        .generate_text(
            &prompt,
            &system,
            GenerateOptions::new().with_temperature(0.7).with_max_tokens(1024),
        )
        .await
    {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::error!("manager assistant returned an empty completion");
            ASSISTANT_FALLBACK_MESSAGE.to_string()
        }
        Err(e) => {
            tracing::error!(error = %e, "manager assistant generation failed");
            ASSISTANT_FALLBACK_MESSAGE.to_string()
        }
    };

    Ok(
        warp::reply::with_status(warp::reply::json(&ManagerChatResponse { reply }), StatusCode::OK)
            .into_response(),
    )
}

fn system_prompt(profile: &Profile) -> String {
    format!(
        "You are the operations assistant for GuardLine, a security services company. \
         You are speaking with {} ({}). Help with guard scheduling, service requests, \
         invoices, and branch operations. Be concise and practical.",
        profile.full_name, profile.role
    )
}

/// Fold prior turns and the new message into a single user prompt. The
/// completion endpoint takes one system and one user message per request.
fn render_conversation(history: &[ChatTurn], message: &str) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let mut rendered = String::from("Conversation so far:\n");
    for turn in history {
        let speaker = match turn.role {
            TurnRole::User => "Manager",
            TurnRole::Assistant => "Assistant",
        };
        rendered.push_str(&format!("{}: {}\n", speaker, turn.content));
    }
    rendered.push_str(&format!("\nManager: {}", message));
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_conversation_without_history() {
        assert_eq!(render_conversation(&[], "what's on today?"), "what's on today?");
    }

    #[test]
    fn test_render_conversation_with_history() {
        let history = vec![
            ChatTurn {
                role: TurnRole::User,
                content: "any open requests?".to_string(),
            },
            ChatTurn {
                role: TurnRole::Assistant,
                content: "two, both pending".to_string(),
            },
        ];
        let rendered = render_conversation(&history, "assign the first one");
        assert!(rendered.contains("Manager: any open requests?"));
        assert!(rendered.contains("Assistant: two, both pending"));
        assert!(rendered.ends_with("Manager: assign the first one"));
    }
}
