//! Academic paper search against the arXiv Atom API.

use serde::Deserialize;

use mh_domain::config::ArxivConfig;
use mh_domain::error::{Error, Result};

use crate::backend::{build_client, from_reqwest, read_ok, squash_ws, TextTool, ToolKind};
use crate::truncate::truncate_chars;

const TOOL: &str = "arxiv";
const TOP_K: usize = 2;
const SUMMARY_CHARS: usize = 800;

pub struct Arxiv {
    base_url: String,
    max_results: usize,
    client: reqwest::Client,
}

impl Arxiv {
    pub fn new(cfg: &ArxivConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.clone(),
            max_results: cfg.max_results.max(TOP_K),
            client: build_client(timeout_secs)?,
        })
    }
}

// ── Atom feed ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    published: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Paper {
    title: String,
    authors: Vec<String>,
    published: String,
    summary: String,
}

impl From<Entry> for Paper {
    fn from(entry: Entry) -> Self {
        Paper {
            title: squash_ws(&entry.title),
            authors: entry
                .authors
                .iter()
                .map(|a| squash_ws(&a.name))
                .filter(|n| !n.is_empty())
                .collect(),
            published: entry.published.trim().chars().take(10).collect(),
            summary: squash_ws(&entry.summary),
        }
    }
}

/// Entities, numeric references included, are decoded by the XML reader.
fn parse_feed(xml: &str) -> Result<Vec<Paper>> {
    let feed: Feed = quick_xml::de::from_str(xml).map_err(|e| Error::Tool {
        tool: TOOL.into(),
        message: format!("invalid Atom feed: {e}"),
    })?;
    Ok(feed
        .entries
        .into_iter()
        .map(Paper::from)
        .filter(|p| !p.title.is_empty())
        .collect())
}

/// The first line of each block is `Title by Authors` so callers can cite it.
fn format_papers(papers: &[Paper]) -> String {
    if papers.is_empty() {
        return "No good Arxiv Result was found".to_string();
    }
    papers
        .iter()
        .take(TOP_K)
        .map(|p| {
            let authors = if p.authors.is_empty() {
                "Unknown authors".to_string()
            } else {
                p.authors.join(", ")
            };
            format!(
                "{} by {}\nPublished: {}\nSummary: {}",
                p.title,
                authors,
                p.published,
                truncate_chars(&p.summary, SUMMARY_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait::async_trait]
impl TextTool for Arxiv {
    fn kind(&self) -> ToolKind {
        ToolKind::Arxiv
    }

    async fn query(&self, query: &str) -> Result<String> {
        let search = format!("all:{query}");
        let max = self.max_results.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("search_query", search.as_str()),
                ("start", "0"),
                ("max_results", max.as_str()),
            ])
            .send()
            .await
            .map_err(|e| from_reqwest(TOOL, e))?;
        let body = read_ok(TOOL, resp).await?;
        Ok(format_papers(&parse_feed(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:mindfulness</title>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <published>2021-01-04T10:00:00Z</published>
    <title>Mindfulness and
      Stress &amp; Anxiety</title>
    <summary>  We study mindfulness
      interventions.  </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
  </entry>
  <entry>
    <published>2020-05-01T00:00:00Z</published>
    <title>Sleep and Mood</title>
    <summary>Sleep matters.</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_not_feed_title() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Mindfulness and Stress & Anxiety");
        assert_eq!(papers[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(papers[0].published, "2021-01-04");
        assert_eq!(papers[0].summary, "We study mindfulness interventions.");
    }

    #[test]
    fn first_line_is_citation() {
        let out = format_papers(&parse_feed(FEED).unwrap());
        assert_eq!(
            out.lines().next().unwrap(),
            "Mindfulness and Stress & Anxiety by Ada Lovelace, Alan Turing"
        );
        assert!(out.contains("Sleep and Mood by Unknown authors"));
    }

    #[test]
    fn empty_feed() {
        assert_eq!(
            format_papers(&parse_feed("<feed></feed>").unwrap()),
            "No good Arxiv Result was found"
        );
    }

    #[test]
    fn decodes_numeric_and_named_entities() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <title>Caf&#233; Culture &#x26; Mood: &quot;Small&quot; Talk</title>
    <published>2019-03-02T00:00:00Z</published>
    <summary>Ratings &lt; 5 were dropped.</summary>
    <author><name>Jos&#xE9; Garc&#237;a</name></author>
  </entry>
</feed>"#;
        let papers = parse_feed(xml).unwrap();
        assert_eq!(papers[0].title, "Café Culture & Mood: \"Small\" Talk");
        assert_eq!(papers[0].summary, "Ratings < 5 were dropped.");
        assert_eq!(papers[0].authors, vec!["José García"]);
    }

    #[test]
    fn malformed_feed_is_a_tool_error() {
        let err = parse_feed("<feed><entry><title>unclosed</feed>").unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
    }
}
