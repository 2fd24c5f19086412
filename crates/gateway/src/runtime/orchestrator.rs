use chrono::{DateTime, Utc};
use serde::Serialize;

use vc_domain::error::{Error, Result};
use vc_domain::trace::TraceEvent;
use vc_providers::ModelSession;
use vc_sessions::ConversationTurn;

use crate::state::AppState;

/// Texts shown to the user in place of a model reply.
pub mod messages {
    pub const SELECT_MODEL_FIRST: &str = "يرجى تحديد نموذج أولاً";

    pub fn model_loaded(task_type: &str) -> String {
        format!("تم تحميل نموذج {task_type} بنجاح")
    }

    pub fn model_load_failed(e: &impl std::fmt::Display) -> String {
        format!("خطأ في تحميل النموذج: {e}")
    }

    pub fn reply_failed(e: &impl std::fmt::Display) -> String {
        format!("خطأ في الحصول على الرد: {e}")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One user message addressed to a conversation.
#[derive(Debug, Clone)]
pub struct MessageInput {
    pub session_id: String,
    pub message: String,
    /// Background text wrapped around the message for this turn only.
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub reply: String,
    pub timestamp: DateTime<Utc>,
    /// False when `reply` carries an inference error instead of model
    /// output; nothing was recorded in that case.
    #[serde(skip)]
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub ok: bool,
    pub message: String,
    pub task_type: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model selection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolve `task_type` and make it the conversation's active model.
///
/// History is kept across switches. Failure leaves the previous model in
/// place and is reported in the returned [`Selection`].
pub fn select_model(state: &AppState, session_id: &str, task_type: &str) -> Selection {
    let (conversation, created) = state.conversations.resolve_or_create(session_id);
    if created {
        tracing::debug!(session_id, "conversation created");
    }

    let session = state
        .selector
        .select(task_type)
        .and_then(|d| ModelSession::initialize(d, state.backend.clone()));

    match session {
        Ok(session) => {
            let resolved = session.descriptor().task_type.clone();
            let previous = conversation.set_active_model(session);
            tracing::info!(
                session_id,
                requested = %task_type,
                task_type = %resolved,
                previous = previous.as_ref().map(|p| p.descriptor().task_type.as_str()),
                "active model set"
            );
            Selection {
                ok: true,
                message: messages::model_loaded(task_type),
                task_type: resolved,
            }
        }
        Err(e) => {
            tracing::warn!(session_id, requested = %task_type, error = %e, "model selection failed");
            Selection {
                ok: false,
                message: messages::model_load_failed(&e),
                task_type: task_type.trim().to_string(),
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message turns
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one turn.
///
/// `EmptyMessage` and `NoModelSelected` come back as errors without touching
/// the log. An inference failure is turned into a displayable reply and
/// records nothing. Turns on the same conversation are serialized by its
/// context lock.
pub async fn handle_message(state: &AppState, input: &MessageInput) -> Result<Reply> {
    if input.message.trim().is_empty() {
        return Err(Error::EmptyMessage);
    }

    // Only select_model creates conversations.
    let Some(conversation) = state.conversations.get(&input.session_id) else {
        return Err(Error::NoModelSelected);
    };
    let Some(model) = conversation.active_model() else {
        return Err(Error::NoModelSelected);
    };

    let mut context = conversation.lock_context().await;
    let prompt = context.render(&input.message, input.context.as_deref());

    match model.invoke(&prompt).await {
        Ok(reply) => {
            context.append(&input.message, &reply);
            TraceEvent::TurnAppended {
                session_id: input.session_id.clone(),
                turns: context.len(),
            }
            .emit();
            Ok(Reply {
                reply,
                timestamp: Utc::now(),
                recorded: true,
            })
        }
        Err(e) => {
            tracing::warn!(
                session_id = %input.session_id,
                task_type = %model.descriptor().task_type,
                error = %e,
                "inference failed, answering with error text"
            );
            Ok(Reply {
                reply: messages::reply_failed(&e),
                timestamp: Utc::now(),
                recorded: false,
            })
        }
    }
}

/// [`handle_message`] on its own task so a slow model never holds up the
/// caller's event loop.
pub async fn run_message(state: AppState, input: MessageInput) -> Result<Reply> {
    tokio::spawn(async move { handle_message(&state, &input).await })
        .await
        .map_err(|e| Error::Other(format!("turn task failed: {e}")))?
}

/// Recorded turns of a conversation, oldest first. `None` if the
/// conversation does not exist.
pub async fn history(state: &AppState, session_id: &str) -> Option<Vec<ConversationTurn>> {
    let conversation = state.conversations.get(session_id)?;
    Some(conversation.history().await)
}
