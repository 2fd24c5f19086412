//! Model catalog and selection endpoints.
//!
//! - `GET  /api/models`       : task type → display name
//! - `GET  /api/models/coding`: coding model metadata
//! - `POST /api/initialize`   : select the active model for a conversation

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use crate::runtime;
use crate::state::AppState;

pub async fn list_models(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.selector.catalog().list_available())
}

pub async fn coding_models(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.selector.catalog().coding_models())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/initialize
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct InitializeRequest {
    /// Requested task type or alias. Older clients send `model_type`.
    /// Absent means the catalog default.
    #[serde(default, alias = "model_type")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub async fn initialize(
    State(state): State<AppState>,
    Json(body): Json<InitializeRequest>,
) -> impl IntoResponse {
    let session_id = state.session_id_or_default(body.session_id.as_deref());
    let requested = body
        .task_type
        .unwrap_or_else(|| state.selector.catalog().default_task_type().to_string());

    let selection = runtime::select_model(&state, &session_id, &requested);

    Json(serde_json::json!({
        "ok": selection.ok,
        "message": selection.message,
        "task_type": selection.task_type,
        "session_id": session_id,
    }))
}
