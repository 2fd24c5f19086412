//! Conversation introspection.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::api::api_error;
use crate::runtime;
use crate::state::AppState;

/// GET /api/sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.conversations.list())
}

/// GET /api/sessions/:id/history
pub async fn history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match runtime::history(&state, &id).await {
        Some(turns) => Json(serde_json::json!({
            "session_id": id,
            "turns": turns,
        }))
        .into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("session not found: {id}")),
    }
}
