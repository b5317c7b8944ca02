use mh_domain::config::{Config, ConfigSeverity, StorageBackend};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
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
fn sessions_default_to_bounded_memory_store() {
    let config = Config::default();
    assert_eq!(config.sessions.backend, StorageBackend::Memory);
    assert_eq!(config.sessions.max_users, 100);
    assert_eq!(config.assistant.mood_history_cap, 30);
    assert!(config.assistant.reasoning_default);
}

#[test]
fn file_backend_parses() {
    let config: Config = toml::from_str(
        r#"
[sessions]
backend = "file"
state_path = "/var/lib/mh"
"#,
    )
    .unwrap();
    assert_eq!(config.sessions.backend, StorageBackend::File);
    assert_eq!(config.sessions.state_path.to_str(), Some("/var/lib/mh"));
}

#[test]
fn default_config_only_warns_about_missing_providers() {
    let issues = Config::default().validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert_eq!(issues[0].field, "llm.providers");
    assert!(Config::default().is_valid());
}

#[test]
fn role_pointing_at_unknown_provider_is_an_error() {
    let config: Config = toml::from_str(
        r#"
[[llm.providers]]
id = "local"
base_url = "http://localhost:11434/v1"

[llm.roles]
oracle = "groq/llama"
"#,
    )
    .unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|e| e.field == "llm.roles.oracle" && e.severity == ConfigSeverity::Error));
    assert!(!config.is_valid());
}

#[test]
fn malformed_role_model_is_an_error() {
    let config: Config = toml::from_str(
        r#"
[[llm.providers]]
id = "local"
base_url = "http://localhost:11434/v1"

[llm.roles]
oracle = "llama"
"#,
    )
    .unwrap();
    let issue = config
        .validate()
        .into_iter()
        .find(|e| e.field == "llm.roles.oracle")
        .unwrap();
    assert!(issue.to_string().starts_with("[ERROR] llm.roles.oracle"));
}

#[test]
fn zero_mood_cap_rejected() {
    let mut config = Config::default();
    config.assistant.mood_history_cap = 0;
    assert!(!config.is_valid());
}
