//! Encyclopedia lookups against the MediaWiki action API.

use serde::Deserialize;

use mh_domain::config::WikipediaConfig;
use mh_domain::error::Result;

use crate::backend::{build_client, from_reqwest, read_ok, squash_ws, tool_error, TextTool, ToolKind};
use crate::truncate::truncate_chars;

const TOOL: &str = "wikipedia";
const TOP_K: usize = 2;
const EXTRACT_CHARS: usize = 1200;

pub struct Wikipedia {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    index: u32,
    title: String,
    #[serde(default)]
    extract: String,
}

impl Wikipedia {
    pub fn new(cfg: &WikipediaConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.clone(),
            client: build_client(timeout_secs)?,
        })
    }
}

/// `Title - extract` per page, in search rank order.
fn format_pages(body: &str) -> Result<String> {
    let parsed: QueryResponse =
        serde_json::from_str(body).map_err(|e| tool_error(TOOL, format!("bad response: {e}")))?;
    let mut pages = parsed.query.map(|q| q.pages).unwrap_or_default();
    if pages.is_empty() {
        return Ok("No good Wikipedia search result was found".to_string());
    }
    pages.sort_by_key(|p| p.index);
    let blocks: Vec<String> = pages
        .iter()
        .take(TOP_K)
        .map(|p| {
            format!(
                "{} - {}",
                p.title,
                truncate_chars(&squash_ws(&p.extract), EXTRACT_CHARS)
            )
        })
        .collect();
    Ok(blocks.join("\n\n"))
}

#[async_trait::async_trait]
impl TextTool for Wikipedia {
    fn kind(&self) -> ToolKind {
        ToolKind::Wikipedia
    }

    async fn query(&self, query: &str) -> Result<String> {
        let limit = TOP_K.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| from_reqwest(TOOL, e))?;
        let body = read_ok(TOOL, resp).await?;
        format_pages(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_sorted_by_rank() {
        let body = r#"{"query":{"pages":[
            {"pageid":2,"index":2,"title":"Panic attack","extract":"A panic attack is..."},
            {"pageid":1,"index":1,"title":"Anxiety","extract":"Anxiety is an\nemotion."}
        ]}}"#;
        let out = format_pages(body).unwrap();
        assert!(out.starts_with("Anxiety - Anxiety is an emotion."));
        assert!(out.contains("\n\nPanic attack - "));
    }

    #[test]
    fn missing_query_means_no_result() {
        let out = format_pages(r#"{"batchcomplete":true}"#).unwrap();
        assert!(out.starts_with("No good Wikipedia"));
    }
}
