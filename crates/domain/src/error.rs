/// Shared error type used across all mh crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("tool {tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("persistence: {0}")]
    Persistence(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable kind, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Http(_) => "http",
            Error::Timeout(_) => "timeout",
            Error::Provider { .. } => "provider",
            Error::Tool { .. } => "tool",
            Error::Persistence(_) => "persistence",
            Error::Config(_) => "config",
            Error::Auth(_) => "auth",
            Error::Other(_) => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let e = Error::Provider {
            provider: "local".into(),
            message: "bad gateway".into(),
        };
        assert_eq!(e.to_string(), "provider local: bad gateway");
        assert_eq!(e.kind(), "provider");
    }

    #[test]
    fn persistence_kind() {
        assert_eq!(Error::Persistence("disk full".into()).kind(), "persistence");
    }
}
