//! AppState construction shared by `serve` and `chat`.

use std::sync::Arc;

use anyhow::Context;

use vc_domain::config::{Config, ConfigSeverity};
use vc_providers::{InferenceBackend, ModelSelector, OpenAiCompatBackend};
use vc_sessions::ConversationStore;
use vc_speech::SpeechServices;

use crate::state::AppState;

/// Validate config, build the HTTP inference backend and the command-line
/// speech services, and return a fully-wired [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    check_config(&config)?;

    let backend: Arc<dyn InferenceBackend> = Arc::new(
        OpenAiCompatBackend::from_config(&config.models).context("creating inference backend")?,
    );
    let speech = Arc::new(
        SpeechServices::from_config(&config.speech).context("creating speech services")?,
    );

    build_app_state_with(config, backend, speech)
}

/// Same as [`build_app_state`] but with caller-supplied collaborators.
/// Config validation is the caller's responsibility.
pub fn build_app_state_with(
    config: Arc<Config>,
    backend: Arc<dyn InferenceBackend>,
    speech: Arc<SpeechServices>,
) -> anyhow::Result<AppState> {
    // ── Catalog + aliases ────────────────────────────────────────────
    let selector =
        Arc::new(ModelSelector::from_config(&config.models).context("loading model catalog")?);
    tracing::info!(
        task_types = selector.catalog().len(),
        aliases = selector.aliases().len(),
        default = %selector.catalog().default_task_type(),
        "model catalog ready"
    );

    // ── Conversations ────────────────────────────────────────────────
    let conversations = Arc::new(ConversationStore::new(config.conversation.history_window));

    // ── Speech ───────────────────────────────────────────────────────
    tracing::info!(
        enabled = speech.settings.enabled,
        languages = ?speech.settings.languages,
        max_pending_jobs = speech.settings.max_pending_jobs,
        "speech services ready"
    );

    Ok(AppState {
        config,
        selector,
        backend,
        conversations,
        speech,
    })
}

/// Log every config issue and fail on any Error-severity one.
fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_prevents_boot() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = build_app_state(Arc::new(config)).err().map(|e| e.to_string());
        assert!(err.unwrap_or_default().contains("config validation failed"));
    }

    #[test]
    fn default_config_boots() {
        let state = build_app_state(Arc::new(Config::default())).unwrap();
        assert!(!state.selector.catalog().is_empty());
        assert!(state.conversations.is_empty());
    }
}
