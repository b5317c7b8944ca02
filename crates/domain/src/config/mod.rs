mod assistant;
mod llm;
mod server;
mod sessions;
mod tools;

pub use assistant::*;
pub use llm::*;
pub use server::*;
pub use sessions::*;
pub use tools::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::MOOD_HISTORY_CAP;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
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

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error(
                "server.port",
                "port must be greater than 0",
            ));
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
        if self.server.turn_timeout_secs == 0 {
            errors.push(ConfigError::error(
                "server.turn_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        // Without an oracle every turn runs on fallback content.
        if self.llm.providers.is_empty() {
            errors.push(ConfigError::warning(
                "llm.providers",
                "no LLM providers configured; replies will use fallback text",
            ));
        }
        for (i, provider) in self.llm.providers.iter().enumerate() {
            if provider.id.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].id"),
                    "provider id must not be empty",
                ));
            }
            if provider.base_url.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].base_url"),
                    "provider base_url must not be empty",
                ));
            }
        }
        for (role, target) in &self.llm.roles {
            match target.split_once('/') {
                Some((pid, model)) if !pid.is_empty() && !model.is_empty() => {
                    if !self.llm.providers.iter().any(|p| p.id == pid) {
                        errors.push(ConfigError::error(
                            format!("llm.roles.{role}"),
                            format!("unknown provider \"{pid}\""),
                        ));
                    }
                }
                _ => errors.push(ConfigError::error(
                    format!("llm.roles.{role}"),
                    "expected \"provider_id/model_name\"",
                )),
            }
        }

        if self.sessions.max_users == 0 {
            errors.push(ConfigError::error(
                "sessions.max_users",
                "must be greater than 0",
            ));
        }
        if self.sessions.max_messages < 2 {
            errors.push(ConfigError::error(
                "sessions.max_messages",
                "must keep at least 2 messages",
            ));
        }

        if self.tools.max_result_chars == 0 {
            errors.push(ConfigError::error(
                "tools.max_result_chars",
                "must be greater than 0",
            ));
        }

        if self.assistant.mood_history_cap == 0 {
            errors.push(ConfigError::error(
                "assistant.mood_history_cap",
                "must be greater than 0",
            ));
        } else if self.assistant.mood_history_cap > MOOD_HISTORY_CAP {
            errors.push(ConfigError::warning(
                "assistant.mood_history_cap",
                format!("values above {MOOD_HISTORY_CAP} are clamped"),
            ));
        }

        errors
    }

    /// True when `validate` reports no `Error`-severity issues.
    pub fn is_valid(&self) -> bool {
        !self
            .validate()
            .iter()
            .any(|e| e.severity == ConfigSeverity::Error)
    }
}
