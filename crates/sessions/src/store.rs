//! In-memory conversation registry.
//!
//! Maps a session id to its [`Conversation`]. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use vc_providers::ModelSession;

use crate::context::ContextManager;
use crate::transcript::ConversationTurn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One conversation: its active model (at most one) and its history.
///
/// The context mutex is held for a whole turn, which serializes message
/// handling per conversation. Swapping the active model never touches the
/// history.
pub struct Conversation {
    id: String,
    created_at: DateTime<Utc>,
    active_model: RwLock<Option<ModelSession>>,
    context: Mutex<ContextManager>,
}

/// Lightweight view used by listings.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub task_type: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, window: usize) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            active_model: RwLock::new(None),
            context: Mutex::new(ContextManager::new(window)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn active_model(&self) -> Option<ModelSession> {
        self.active_model.read().clone()
    }

    /// Install `session` as the active model, returning the previous one.
    pub fn set_active_model(&self, session: ModelSession) -> Option<ModelSession> {
        self.active_model.write().replace(session)
    }

    /// Exclusive access to the context for the duration of one turn.
    pub async fn lock_context(&self) -> MutexGuard<'_, ContextManager> {
        self.context.lock().await
    }

    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.context.lock().await.history().to_vec()
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            session_id: self.id.clone(),
            created_at: self.created_at,
            task_type: self
                .active_model
                .read()
                .as_ref()
                .map(|m| m.descriptor().task_type.clone()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ConversationStore {
    window: usize,
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
}

impl ConversationStore {
    /// `window` is the history window given to every new conversation.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Conversation>> {
        self.conversations.read().get(session_id).cloned()
    }

    /// Resolve or create the conversation for `session_id`.
    /// Returns `(conversation, is_new)`.
    pub fn resolve_or_create(&self, session_id: &str) -> (Arc<Conversation>, bool) {
        // Fast path: conversation already exists.
        if let Some(conv) = self.get(session_id) {
            return (conv, false);
        }

        let mut conversations = self.conversations.write();
        if let Some(conv) = conversations.get(session_id) {
            return (conv.clone(), false);
        }
        let conv = Arc::new(Conversation::new(session_id, self.window));
        conversations.insert(session_id.to_owned(), conv.clone());
        tracing::info!(session_id = %session_id, "conversation created");
        (conv, true)
    }

    /// Summaries of all conversations, oldest first.
    pub fn list(&self) -> Vec<ConversationSummary> {
        let mut out: Vec<_> = self
            .conversations
            .read()
            .values()
            .map(|c| c.summary())
            .collect();
        out.sort_by_key(|s| s.created_at);
        out
    }

    pub fn len(&self) -> usize {
        self.conversations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.read().is_empty()
    }
}
