use std::sync::Arc;

use vc_domain::config::Config;
use vc_providers::{InferenceBackend, ModelSelector};
use vc_sessions::ConversationStore;
use vc_speech::SpeechServices;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    // ── Models ───────────────────────────────────────────────────────
    pub selector: Arc<ModelSelector>,
    pub backend: Arc<dyn InferenceBackend>,
    // ── Conversations ────────────────────────────────────────────────
    pub conversations: Arc<ConversationStore>,
    // ── Speech (shared devices + collaborators) ──────────────────────
    pub speech: Arc<SpeechServices>,
}

impl AppState {
    /// Session id used when a request does not name one.
    pub fn default_session_id(&self) -> &str {
        &self.config.conversation.default_session_id
    }

    /// Resolve an optional, possibly blank, session id from a request.
    pub fn session_id_or_default(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.default_session_id())
            .to_string()
    }
}
