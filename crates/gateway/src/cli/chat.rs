//! `voicechat chat`: interactive terminal conversation.
//!
//! Runs the same orchestrator as `/api/chat` against a single in-process
//! conversation. Slash-commands switch models and inspect history.

use std::sync::Arc;

use vc_domain::config::Config;
use vc_domain::error::Error;

use crate::bootstrap;
use crate::runtime::orchestrator::messages;
use crate::runtime::{self, MessageInput};
use crate::state::AppState;

const SESSION_ID: &str = "cli";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(config: Arc<Config>, task_type: Option<String>) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;

    let initial = task_type
        .unwrap_or_else(|| state.selector.catalog().default_task_type().to_string());
    switch_model(&state, &initial);

    let mut rl = rustyline::DefaultEditor::new()?;

    // Status goes to stderr so stdout holds only replies.
    eprintln!("VoiceChat terminal chat");
    eprintln!("Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(&state, trimmed).await {
                        break;
                    }
                    continue;
                }

                send_message(&state, trimmed).await;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command. Returns `true` if the REPL should exit.
async fn handle_slash_command(state: &AppState, input: &str) -> bool {
    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (input, ""),
    };

    match cmd {
        "/exit" | "/quit" => return true,

        "/model" => {
            if arg.is_empty() {
                let current = state
                    .conversations
                    .get(SESSION_ID)
                    .and_then(|c| c.active_model())
                    .map(|m| m.descriptor().task_type.clone())
                    .unwrap_or_else(|| "(none)".into());
                eprintln!("Current model: {current}");
                eprintln!("Usage: /model <task type>");
            } else {
                switch_model(state, arg);
            }
        }

        "/models" => {
            for (task_type, name) in state.selector.catalog().list_available() {
                eprintln!("  {task_type:<14} {name}");
            }
        }

        "/history" => {
            let turns = runtime::history(state, SESSION_ID).await.unwrap_or_default();
            if turns.is_empty() {
                eprintln!("(no turns yet)");
            }
            for turn in turns {
                eprintln!("[{}]", turn.timestamp.format("%H:%M:%S"));
                eprintln!("  you: {}", turn.user_message);
                eprintln!("  bot: {}", turn.model_reply);
            }
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /model <task>    Switch model (history is kept)");
            eprintln!("  /models          List task types");
            eprintln!("  /history         Show this conversation");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

fn switch_model(state: &AppState, task_type: &str) {
    let selection = runtime::select_model(state, SESSION_ID, task_type);
    if selection.ok {
        eprintln!("{} [{}]", selection.message, selection.task_type);
    } else {
        eprintln!("\x1B[31m{}\x1B[0m", selection.message);
    }
}

async fn send_message(state: &AppState, message: &str) {
    let input = MessageInput {
        session_id: SESSION_ID.to_string(),
        message: message.to_string(),
        context: None,
    };
    match runtime::run_message(state.clone(), input).await {
        Ok(reply) => println!("{}", reply.reply),
        Err(Error::NoModelSelected) => eprintln!("{}", messages::SELECT_MODEL_FIRST),
        Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
    }
}
