use std::fmt;

use serde::{Deserialize, Serialize};

use mh_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Text-producing retrieval tools. `name()` is the key under which results
/// land in session `tool_results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    MentalHealthInfo,
    WebSearch,
    Wikipedia,
    Arxiv,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::MentalHealthInfo => "mental_health_info",
            ToolKind::WebSearch => "web_search",
            ToolKind::Wikipedia => "wikipedia",
            ToolKind::Arxiv => "arxiv",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One video search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHit {
    pub video_id: String,
    pub url: String,
    pub title: String,
}

/// Text content available for a single video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub url: String,
    pub title: String,
    pub channel: String,
    /// Best available text for the video (its description).
    pub text: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
pub trait TextTool: Send + Sync {
    fn kind(&self) -> ToolKind;
    async fn query(&self, query: &str) -> Result<String>;
}

#[async_trait::async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoHit>>;
    async fn details(&self, url: &str) -> Result<VideoDetails>;
}

// ── shared helpers ──────────────────────────────────────────────────

pub(crate) fn tool_error(tool: &str, message: impl Into<String>) -> Error {
    Error::Tool {
        tool: tool.into(),
        message: message.into(),
    }
}

/// Map a [`reqwest::Error`] into the domain error, keeping timeouts distinct.
pub(crate) fn from_reqwest(tool: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(format!("{tool}: {e}"))
    } else {
        tool_error(tool, e.to_string())
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(concat!("mh-assistant/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Http(e.to_string()))
}

/// Read a response body, turning non-2xx statuses into tool errors.
pub(crate) async fn read_ok(tool: &str, resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| from_reqwest(tool, e))?;
    if !status.is_success() {
        return Err(tool_error(
            tool,
            format!("HTTP {} - {}", status.as_u16(), crate::truncate_chars(&body, 300)),
        ));
    }
    Ok(body)
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub(crate) fn squash_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_are_result_keys() {
        assert_eq!(ToolKind::MentalHealthInfo.name(), "mental_health_info");
        assert_eq!(ToolKind::WebSearch.to_string(), "web_search");
    }

    #[test]
    fn squash_whitespace() {
        assert_eq!(squash_ws("  a\n\n b\tc "), "a b c");
    }
}
