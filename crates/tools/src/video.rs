//! Video search through the YouTube Data API.

use serde::Deserialize;

use mh_domain::config::VideoConfig;
use mh_domain::error::Result;

use crate::backend::{
    build_client, from_reqwest, read_ok, tool_error, VideoDetails, VideoHit, VideoSearch,
};

const TOOL: &str = "youtube_search";
const WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";

pub struct YouTube {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "channelTitle")]
    channel_title: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    snippet: Snippet,
}

impl YouTube {
    pub fn new(cfg: &VideoConfig, api_key: String, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            client: build_client(timeout_secs)?,
        })
    }
}

/// Extract the `v=` id from a watch URL, or the path segment of a short link.
pub fn video_id(url: &str) -> Option<String> {
    let url = url.trim();
    if let Some((_, query)) = url.split_once('?') {
        let id = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("v="))
            .filter(|id| !id.is_empty());
        if let Some(id) = id {
            return Some(id.to_string());
        }
    }
    url.split_once("youtu.be/")
        .map(|(_, rest)| rest.split(['?', '&', '/']).next().unwrap_or(rest))
        .filter(|id| !id.is_empty())
        .map(String::from)
}

fn parse_search(body: &str) -> Result<Vec<VideoHit>> {
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| tool_error(TOOL, format!("bad response: {e}")))?;
    Ok(parsed
        .items
        .into_iter()
        .filter_map(|item| {
            let id = item.id.video_id?;
            Some(VideoHit {
                url: format!("{WATCH_PREFIX}{id}"),
                video_id: id,
                title: item.snippet.title,
            })
        })
        .collect())
}

fn parse_details(url: &str, body: &str) -> Result<VideoDetails> {
    let parsed: VideosResponse =
        serde_json::from_str(body).map_err(|e| tool_error(TOOL, format!("bad response: {e}")))?;
    let item = parsed
        .items
        .into_iter()
        .next()
        .ok_or_else(|| tool_error(TOOL, format!("video not found: {url}")))?;
    Ok(VideoDetails {
        url: url.to_string(),
        title: item.snippet.title,
        channel: item.snippet.channel_title,
        text: item.snippet.description,
    })
}

#[async_trait::async_trait]
impl VideoSearch for YouTube {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<VideoHit>> {
        let url = format!("{}/search", self.base_url);
        let max = max_results.max(1).to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("safeSearch", "strict"),
                ("maxResults", max.as_str()),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| from_reqwest(TOOL, e))?;
        let body = read_ok(TOOL, resp).await?;
        parse_search(&body)
    }

    async fn details(&self, url: &str) -> Result<VideoDetails> {
        let id = video_id(url).ok_or_else(|| tool_error(TOOL, format!("not a video URL: {url}")))?;
        let endpoint = format!("{}/videos", self.base_url);
        let resp = self
            .client
            .get(&endpoint)
            .query(&[
                ("part", "snippet"),
                ("id", id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| from_reqwest(TOOL, e))?;
        let body = read_ok(TOOL, resp).await?;
        parse_details(url, &body)
    }
}
