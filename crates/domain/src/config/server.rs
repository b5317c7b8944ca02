use serde::{Deserialize, Serialize};

/// `[server]`: HTTP listener and request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors: CorsConfig,
    /// Env var holding the bearer token. When it is unset or empty every
    /// route is open and a warning is logged at startup.
    pub api_token_env: String,
    pub max_concurrent_requests: usize,
    /// Upper bound on one conversational turn.
    pub turn_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3210,
            host: "127.0.0.1".into(),
            cors: CorsConfig::default(),
            api_token_env: "MH_API_TOKEN".into(),
            max_concurrent_requests: 256,
            turn_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `host:*` matches any port; a lone `"*"` allows everything.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:*".into(), "http://127.0.0.1:*".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg: ServerConfig = toml::from_str("port = 8080\nturn_timeout_secs = 30\n").unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.turn_timeout_secs, 30);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.max_concurrent_requests, 256);
    }

    #[test]
    fn empty_table_is_default() {
        let cfg: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.api_token_env, "MH_API_TOKEN");
        assert_eq!(cfg.cors.allowed_origins.len(), 2);
    }
}
