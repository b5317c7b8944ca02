use std::time::Duration;

use mh_domain::config::{AuthConfig, AuthMode};
use mh_domain::error::{Error, Result};

pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(from_reqwest)
}

/// API key for `provider_id`: none for keyless servers, then the inline
/// `key`, then the `env` variable. An empty variable counts as unset.
pub(crate) fn resolve_api_key(provider_id: &str, auth: &AuthConfig) -> Result<Option<String>> {
    if auth.mode == AuthMode::None {
        return Ok(None);
    }

    if let Some(key) = auth.key.as_ref().filter(|k| !k.is_empty()) {
        tracing::warn!(provider_id, "API key read from plaintext config; prefer `env`");
        return Ok(Some(key.clone()));
    }

    match &auth.env {
        Some(var) => std::env::var(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Some)
            .ok_or_else(|| Error::Auth(format!("{provider_id}: environment variable '{var}' is not set"))),
        None => Err(Error::Auth(format!(
            "{provider_id}: no API key configured (set `env`, `key`, or mode = \"none\")"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_key() {
        let auth = AuthConfig {
            key: Some("sk-test-123".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key("p", &auth).unwrap().as_deref(), Some("sk-test-123"));
    }

    #[test]
    fn key_from_env() {
        let var = "MH_TEST_PROVIDER_KEY_ENV";
        std::env::set_var(var, "from-env");
        let auth = AuthConfig {
            env: Some(var.into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key("p", &auth).unwrap().as_deref(), Some("from-env"));
        std::env::remove_var(var);
    }

    #[test]
    fn blank_env_value_is_unset() {
        let var = "MH_TEST_PROVIDER_KEY_BLANK";
        std::env::set_var(var, "  ");
        let auth = AuthConfig {
            env: Some(var.into()),
            ..Default::default()
        };
        let err = resolve_api_key("groq", &auth).unwrap_err();
        assert!(err.to_string().contains("groq"));
        assert!(err.to_string().contains(var));
        std::env::remove_var(var);
    }

    #[test]
    fn nothing_configured_is_an_auth_error() {
        let err = resolve_api_key("p", &AuthConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn keyless_mode_ignores_key() {
        let auth = AuthConfig {
            mode: AuthMode::None,
            key: Some("ignored".into()),
            ..Default::default()
        };
        assert!(resolve_api_key("p", &auth).unwrap().is_none());
    }
}
