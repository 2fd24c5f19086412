mod conversation;
mod models;
mod observability;
mod server;
mod speech;

pub use conversation::*;
pub use models::*;
pub use observability::*;
pub use server::*;
pub use speech::*;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good. Any issue with
    /// [`ConfigSeverity::Error`] must stop startup.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }
        if self.server.max_concurrent_requests == 0 {
            errors.push(ConfigError::error(
                "server.max_concurrent_requests",
                "must be greater than 0",
            ));
        }

        self.validate_models(&mut errors);

        if self.conversation.history_window == 0 {
            errors.push(ConfigError::error(
                "conversation.history_window",
                "history window must be at least 1",
            ));
        }
        if self.conversation.default_session_id.trim().is_empty() {
            errors.push(ConfigError::error(
                "conversation.default_session_id",
                "default session id must not be empty",
            ));
        }

        self.validate_speech(&mut errors);

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError::error(
                "observability.sample_rate",
                "sample rate must be within [0.0, 1.0]",
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }

    fn validate_models(&self, errors: &mut Vec<ConfigError>) {
        let models = &self.models;
        let entries = models.catalog_entries();

        if models.request_timeout_ms == 0 {
            errors.push(ConfigError::error(
                "models.request_timeout_ms",
                "timeout must be greater than 0",
            ));
        }
        if entries.is_empty() {
            errors.push(ConfigError::error("models.catalog", "catalog must not be empty"));
        }

        let mut task_types = HashSet::new();
        for (i, entry) in entries.iter().enumerate() {
            if entry.task_type.trim().is_empty() {
                errors.push(ConfigError::error(
                    format!("models.catalog[{i}].task_type"),
                    "task type must not be empty",
                ));
            } else if !task_types.insert(entry.task_type.as_str()) {
                errors.push(ConfigError::error(
                    format!("models.catalog[{i}].task_type"),
                    format!("duplicate task type \"{}\"", entry.task_type),
                ));
            }
            if entry.model_id.trim().is_empty() {
                errors.push(ConfigError::error(
                    format!("models.catalog[{i}].model_id"),
                    "model id must not be empty",
                ));
            }
            let endpoint = entry.endpoint.as_deref().unwrap_or(&models.default_endpoint);
            if endpoint.trim().is_empty() {
                errors.push(ConfigError::error(
                    format!("models.catalog[{i}].endpoint"),
                    "endpoint must not be empty",
                ));
            }
            if !(0.0..=1.0).contains(&entry.temperature) {
                errors.push(ConfigError::error(
                    format!("models.catalog[{i}].temperature"),
                    "temperature must be within [0.0, 1.0]",
                ));
            }
        }

        if models.default_task_type.trim().is_empty() {
            errors.push(ConfigError::error(
                "models.default_task_type",
                "default task type must not be empty",
            ));
        } else if !task_types.contains(models.default_task_type.as_str()) {
            errors.push(ConfigError::error(
                "models.default_task_type",
                format!(
                    "default task type \"{}\" is not in the catalog",
                    models.default_task_type
                ),
            ));
        }

        let mut alias_targets: HashMap<&str, &str> = HashMap::new();
        for (i, alias) in models.alias_entries().iter().enumerate() {
            if !task_types.contains(alias.task_type.as_str()) {
                errors.push(ConfigError::error(
                    format!("models.aliases[{i}].task_type"),
                    format!("alias target \"{}\" is not in the catalog", alias.task_type),
                ));
            }
            match alias_targets.insert(alias.alias.as_str(), alias.task_type.as_str()) {
                Some(prev) if prev != alias.task_type => {
                    errors.push(ConfigError::error(
                        format!("models.aliases[{i}].alias"),
                        format!(
                            "alias \"{}\" maps to both \"{prev}\" and \"{}\"",
                            alias.alias, alias.task_type
                        ),
                    ));
                }
                _ => {}
            }
        }

        if std::env::var(&models.api_key_env).map_or(true, |v| v.is_empty()) {
            errors.push(ConfigError::warning(
                "models.api_key_env",
                format!("env var {} is not set; inference calls will be unauthenticated", models.api_key_env),
            ));
        }
    }

    fn validate_speech(&self, errors: &mut Vec<ConfigError>) {
        let speech = &self.speech;
        if !speech.enabled {
            return;
        }
        if speech.listen_timeout_secs == 0 {
            errors.push(ConfigError::error(
                "speech.listen_timeout_secs",
                "timeout must be greater than 0",
            ));
        }
        if speech.phrase_time_limit_secs == 0 {
            errors.push(ConfigError::error(
                "speech.phrase_time_limit_secs",
                "phrase limit must be greater than 0",
            ));
        }
        if speech.max_pending_jobs == 0 {
            errors.push(ConfigError::error(
                "speech.max_pending_jobs",
                "must allow at least one pending job",
            ));
        }
        if speech.recognition_languages.is_empty() {
            errors.push(ConfigError::error(
                "speech.recognition_languages",
                "at least one recognition language is required",
            ));
        }
        if speech.capture.program.trim().is_empty() {
            errors.push(ConfigError::error("speech.capture.program", "program must not be empty"));
        }
        if speech.synthesizer.program.trim().is_empty() {
            errors.push(ConfigError::error(
                "speech.synthesizer.program",
                "program must not be empty",
            ));
        }
        if speech.recognizer.endpoint.trim().is_empty() {
            errors.push(ConfigError::error(
                "speech.recognizer.endpoint",
                "endpoint must not be empty",
            ));
        }
        if speech.recognizer.timeout_ms == 0 {
            errors.push(ConfigError::error(
                "speech.recognizer.timeout_ms",
                "timeout must be greater than 0",
            ));
        }
    }
}
