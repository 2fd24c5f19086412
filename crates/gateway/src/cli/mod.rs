pub mod chat;
pub mod config;
pub mod doctor;
pub mod models;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vc_domain::config::Config;

/// VoiceChat: text and voice chat over hosted models.
#[derive(Debug, Parser)]
#[command(name = "voicechat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP/WebSocket server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the model catalog.
    Models {
        /// Only list coding models, with their metadata.
        #[arg(long)]
        coding: bool,
    },
    /// Chat with a model in the terminal.
    Chat {
        /// Task type (or alias) to start with.
        #[arg(long)]
        task_type: Option<String>,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `VC_CONFIG` (or `config.toml`).
/// Returns the parsed [`Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("VC_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(Path::new(&config_path))?;
    Ok((config, config_path))
}

/// A missing file yields all defaults; an unreadable or malformed one is an
/// error.
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.conversation.history_window, 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 8080\n\n[conversation]\nhistory_window = 3\n")
            .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.conversation.history_window, 3);
        assert!(config.speech.enabled);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["voicechat", "chat", "--task-type", "code_python"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Chat { task_type: Some(ref t) }) if t == "code_python"
        ));

        let cli = Cli::try_parse_from(["voicechat"]).unwrap();
        assert!(cli.command.is_none());
    }
}
