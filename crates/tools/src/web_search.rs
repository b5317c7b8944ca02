//! Web search through the Tavily search API.

use serde::Deserialize;
use serde_json::json;

use mh_domain::config::WebSearchConfig;
use mh_domain::error::Result;

use crate::backend::{build_client, from_reqwest, read_ok, squash_ws, tool_error, TextTool, ToolKind};

const TOOL: &str = "web_search";

pub struct TavilySearch {
    base_url: String,
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(cfg: &WebSearchConfig, api_key: String, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_results: cfg.max_results.max(1),
            client: build_client(timeout_secs)?,
        })
    }
}

/// One block per hit: `title - url` on the first line, snippet below.
fn format_results(body: &str) -> Result<String> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| tool_error(TOOL, format!("bad response: {e}")))?;
    if parsed.results.is_empty() {
        return Ok("No web results found.".to_string());
    }
    let blocks: Vec<String> = parsed
        .results
        .iter()
        .map(|hit| {
            let title = if hit.title.trim().is_empty() {
                "Untitled"
            } else {
                hit.title.trim()
            };
            format!("{} - {}\n{}", title, hit.url.trim(), squash_ws(&hit.content))
        })
        .collect();
    Ok(blocks.join("\n\n"))
}

#[async_trait::async_trait]
impl TextTool for TavilySearch {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    async fn query(&self, query: &str) -> Result<String> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(url = %url, "web search request");
        let resp = self
            .client
            .post(&url)
            .json(&json!({
                "api_key": self.api_key,
                "query": query,
                "max_results": self.max_results,
            }))
            .send()
            .await
            .map_err(|e| from_reqwest(TOOL, e))?;
        let body = read_ok(TOOL, resp).await?;
        format_results(&body)
    }
}
