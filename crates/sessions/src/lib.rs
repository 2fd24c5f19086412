//! Conversation state for VoiceChat.
//!
//! Each conversation owns an append-only log of turns and renders a bounded
//! window of it into the next prompt. Conversations live in memory only and
//! are addressed by session id through [`ConversationStore`].

pub mod context;
pub mod store;
pub mod transcript;

pub use context::ContextManager;
pub use store::{Conversation, ConversationStore};
pub use transcript::{ConversationLog, ConversationTurn};
