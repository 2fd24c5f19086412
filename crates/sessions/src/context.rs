//! Prompt assembly from a bounded window of conversation history.

use crate::transcript::{ConversationLog, ConversationTurn};
use chrono::Utc;

/// Owns one conversation's log and turns it into prompts.
///
/// Rendering is read-only; [`append`](Self::append) is the only mutator and
/// callers invoke it only after a successful model reply.
#[derive(Debug)]
pub struct ContextManager {
    log: ConversationLog,
    window: usize,
}

impl ContextManager {
    pub fn new(window: usize) -> Self {
        Self {
            log: ConversationLog::new(),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Render the prompt for `current_message` using the configured window.
    pub fn render(&self, current_message: &str, explicit_context: Option<&str>) -> String {
        self.render_context(current_message, explicit_context, self.window)
    }

    /// Render the prompt for `current_message`.
    ///
    /// Non-empty `explicit_context` wraps the message as
    /// `Context: ..\n\nQuestion: ..`. With history present the last `window`
    /// turns are prepended under a `Conversation history:` header.
    pub fn render_context(
        &self,
        current_message: &str,
        explicit_context: Option<&str>,
        window: usize,
    ) -> String {
        let working = match explicit_context {
            Some(ctx) if !ctx.is_empty() => {
                format!("Context: {ctx}\n\nQuestion: {current_message}")
            }
            _ => current_message.to_string(),
        };

        if self.log.is_empty() {
            return working;
        }

        let history = self
            .log
            .recent(window)
            .iter()
            .map(|t| format!("User: {}\nAssistant: {}", t.user_message, t.model_reply))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Conversation history:\n{history}\n\nCurrent message: {working}")
    }

    /// Record a completed exchange stamped with the current time.
    pub fn append(&mut self, user_message: &str, model_reply: &str) {
        self.log.push(ConversationTurn {
            user_message: user_message.to_string(),
            model_reply: model_reply.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.log.turns()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_without_context_is_identity() {
        let cm = ContextManager::new(5);
        assert_eq!(cm.render("hello there", None), "hello there");
        assert_eq!(cm.render("hello there", Some("")), "hello there");
    }

    #[test]
    fn explicit_context_wraps_question() {
        let cm = ContextManager::new(5);
        assert_eq!(
            cm.render("is it raining?", Some("weather")),
            "Context: weather\n\nQuestion: is it raining?"
        );
    }

    #[test]
    fn history_is_prepended() {
        let mut cm = ContextManager::new(5);
        cm.append("hi", "hello!");
        assert_eq!(
            cm.render("how are you?", None),
            "Conversation history:\nUser: hi\nAssistant: hello!\n\nCurrent message: how are you?"
        );
    }

    #[test]
    fn history_and_context_combine() {
        let mut cm = ContextManager::new(5);
        cm.append("a", "b");
        assert_eq!(
            cm.render("q", Some("ctx")),
            "Conversation history:\nUser: a\nAssistant: b\n\nCurrent message: Context: ctx\n\nQuestion: q"
        );
    }

    #[test]
    fn window_keeps_last_five_of_six() {
        let mut cm = ContextManager::new(5);
        for i in 1..=6 {
            cm.append(&format!("T{i}"), &format!("R{i}"));
        }
        let prompt = cm.render("next", None);
        assert!(!prompt.contains("User: T1\n"));
        for i in 2..=6 {
            assert!(prompt.contains(&format!("User: T{i}\nAssistant: R{i}")));
        }
        let t2 = prompt.find("User: T2").unwrap();
        let t6 = prompt.find("User: T6").unwrap();
        assert!(t2 < t6);
    }

    #[test]
    fn rendering_does_not_mutate() {
        let mut cm = ContextManager::new(5);
        cm.append("a", "b");
        let _ = cm.render("x", Some("y"));
        let _ = cm.render_context("x", None, 1);
        assert_eq!(cm.len(), 1);
    }

    #[test]
    fn explicit_window_overrides_configured() {
        let mut cm = ContextManager::new(5);
        cm.append("one", "1");
        cm.append("two", "2");
        let prompt = cm.render_context("three", None, 1);
        assert!(!prompt.contains("User: one"));
        assert!(prompt.contains("User: two"));
    }
}
