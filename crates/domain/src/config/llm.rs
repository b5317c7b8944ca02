use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role the assistant pipeline resolves its model from.
pub const ORACLE_ROLE: &str = "oracle";

/// `[llm]`: providers and which one answers each role.
///
/// ```toml
/// [llm]
/// temperature = 0.3
///
/// [llm.roles]
/// oracle = "groq/llama-3.3-70b-versatile"
///
/// [[llm.providers]]
/// id = "groq"
/// base_url = "https://api.groq.com/openai/v1"
/// auth = { env = "GROQ_API_KEY" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Per-request HTTP timeout.
    pub default_timeout_ms: u64,
    pub temperature: f32,
    /// Role name to `"provider_id/model_name"`.
    pub roles: HashMap<String, String>,
    pub providers: Vec<ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 20_000,
            temperature: 0.3,
            roles: HashMap::new(),
            providers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    #[serde(default)]
    pub kind: ProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
    /// Used when the role does not name a model.
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    OpenaiCompat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    /// Defaults to `Authorization`.
    pub header: Option<String>,
    /// Defaults to `"Bearer "`.
    pub prefix: Option<String>,
    pub env: Option<String>,
    /// Plaintext key; `env` is preferred.
    pub key: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    #[default]
    ApiKey,
    /// Local servers such as Ollama.
    None,
}
