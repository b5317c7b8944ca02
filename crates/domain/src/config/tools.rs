use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Retrieval tools
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the retrieval backends the assistant may call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// HTTP timeout for every remote tool call.
    #[serde(default = "d_15")]
    pub timeout_secs: u64,
    /// Tool output longer than this is truncated before entering state.
    #[serde(default = "d_2000")]
    pub max_result_chars: usize,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub web_search: WebSearchConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub arxiv: ArxivConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_result_chars: 2000,
            knowledge: KnowledgeConfig::default(),
            web_search: WebSearchConfig::default(),
            wikipedia: WikipediaConfig::default(),
            arxiv: ArxivConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_3")]
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_k: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_tavily_url")]
    pub base_url: String,
    /// Env var holding the Tavily API key.
    #[serde(default = "d_tavily_env")]
    pub api_key_env: String,
    #[serde(default = "d_3")]
    pub max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: d_tavily_url(),
            api_key_env: d_tavily_env(),
            max_results: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_wikipedia_url")]
    pub base_url: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: d_wikipedia_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_arxiv_url")]
    pub base_url: String,
    #[serde(default = "d_3")]
    pub max_results: usize,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: d_arxiv_url(),
            max_results: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "d_true")]
    pub enabled: bool,
    #[serde(default = "d_youtube_url")]
    pub base_url: String,
    /// Env var holding the YouTube Data API key.
    #[serde(default = "d_youtube_env")]
    pub api_key_env: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: d_youtube_url(),
            api_key_env: d_youtube_env(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_true() -> bool {
    true
}
fn d_3() -> usize {
    3
}
fn d_15() -> u64 {
    15
}
fn d_2000() -> usize {
    2000
}
fn d_tavily_url() -> String {
    "https://api.tavily.com".into()
}
fn d_tavily_env() -> String {
    "TAVILY_API_KEY".into()
}
fn d_wikipedia_url() -> String {
    "https://en.wikipedia.org/w/api.php".into()
}
fn d_arxiv_url() -> String {
    "http://export.arxiv.org/api/query".into()
}
fn d_youtube_url() -> String {
    "https://www.googleapis.com/youtube/v3".into()
}
fn d_youtube_env() -> String {
    "YOUTUBE_API_KEY".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
