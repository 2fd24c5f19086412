pub mod chat;
pub mod health;
pub mod models;
pub mod sessions;
pub mod speech_ws;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        // Models
        .route("/api/models", get(models::list_models))
        .route("/api/models/coding", get(models::coding_models))
        .route("/api/initialize", post(models::initialize))
        // Conversation
        .route("/api/chat", post(chat::chat))
        .route("/api/sessions", get(sessions::list_sessions))
        .route("/api/sessions/:id/history", get(sessions::history))
        // Realtime speech channel
        .route("/ws", get(speech_ws::speech_ws))
}

/// `{"error": ...}` with the given status.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
