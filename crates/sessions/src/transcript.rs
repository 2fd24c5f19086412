//! Append-only conversation transcript.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One completed exchange. Immutable once recorded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversationTurn {
    pub user_message: String,
    pub model_reply: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered turns of one conversation.
///
/// Storage grows without bound; readers only ever look at a suffix.
#[derive(Debug, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The last `n` turns in chronological order.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
