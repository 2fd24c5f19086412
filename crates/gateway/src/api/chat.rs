//! `POST /api/chat`: one conversation turn.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use vc_domain::error::Error;

use crate::api::api_error;
use crate::runtime::orchestrator::messages;
use crate::runtime::{run_message, MessageInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Background text for this turn only.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    let session_id = state.session_id_or_default(body.session_id.as_deref());
    let input = MessageInput {
        session_id: session_id.clone(),
        message: body.message,
        context: body.context,
    };

    match run_message(state, input).await {
        Ok(reply) => Json(serde_json::json!({
            "reply": reply.reply,
            "timestamp": reply.timestamp,
            "session_id": session_id,
        }))
        .into_response(),
        Err(Error::EmptyMessage) => api_error(StatusCode::BAD_REQUEST, Error::EmptyMessage.to_string()),
        // Answered with text like any other reply; the client shows it as-is.
        Err(Error::NoModelSelected) => Json(serde_json::json!({
            "reply": messages::SELECT_MODEL_FIRST,
            "timestamp": chrono::Utc::now(),
            "session_id": session_id,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "chat turn failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
