use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Number of most recent turns rendered into each prompt.
    #[serde(default = "d_5")]
    pub history_window: usize,
    /// Session id used by requests that do not name one.
    #[serde(default = "d_session")]
    pub default_session_id: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: 5,
            default_session_id: d_session(),
        }
    }
}

fn d_5() -> usize {
    5
}
fn d_session() -> String {
    "main".into()
}
