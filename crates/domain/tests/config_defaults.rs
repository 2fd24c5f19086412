use vc_domain::config::{Config, ConfigSeverity};

#[test]
fn default_server_listens_on_localhost_5000() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5000);
}

#[test]
fn default_cors_allows_only_localhost() {
    let config = Config::default();
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://localhost:*".to_string()));
    assert!(config
        .server
        .cors
        .allowed_origins
        .contains(&"http://127.0.0.1:*".to_string()));
}

#[test]
fn full_file_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 8000

[models]
default_task_type = "chat"
api_key_env = "MY_HF_TOKEN"

[conversation]
history_window = 3

[speech]
enabled = false
recognition_languages = ["en-US"]

[observability]
otlp_endpoint = "http://collector:4317"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.models.default_task_type, "chat");
    assert_eq!(config.models.api_key_env, "MY_HF_TOKEN");
    assert_eq!(config.conversation.history_window, 3);
    assert!(!config.speech.enabled);
    assert_eq!(config.speech.recognition_languages, vec!["en-US"]);
    assert_eq!(
        config.observability.otlp_endpoint.as_deref(),
        Some("http://collector:4317")
    );
}

#[test]
fn custom_catalog_replaces_builtin() {
    let toml_str = r#"
[models]
default_task_type = "general"
default_endpoint = "http://localhost:8080/v1"

[[models.catalog]]
task_type = "general"
model_key = "m1"
model_id = "org/m1"
display_name = "M1"

[[models.catalog]]
task_type = "code"
model_key = "m2"
model_id = "org/m2"
display_name = "M2"
temperature = 0.2
endpoint = "http://localhost:9090/v1"

[[models.aliases]]
alias = "programming"
task_type = "code"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let entries = config.models.catalog_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].endpoint.as_deref(), Some("http://localhost:9090/v1"));
    assert_eq!(config.models.alias_entries().len(), 1);
    let errors: Vec<_> = config
        .validate()
        .into_iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .collect();
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn alias_to_unknown_task_type_fails_validation() {
    let toml_str = r#"
[[models.aliases]]
alias = "poems"
task_type = "poetry"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(config
        .validate()
        .iter()
        .any(|e| e.severity == ConfigSeverity::Error && e.field == "models.aliases[0].task_type"));
}
