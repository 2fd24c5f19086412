//! Conversation runtime: model selection and message turns on top of the
//! conversation store.
//!
//! Entry points: [`select_model`] installs a model session on a
//! conversation, [`run_message`] runs one turn on its own task and
//! [`history`] reads back recorded turns.

pub mod orchestrator;

pub use orchestrator::{
    handle_message, history, run_message, select_model, MessageInput, Reply, Selection,
};
