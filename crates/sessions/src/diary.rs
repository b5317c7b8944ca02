//! Diary entry storage and keyword search on top of a [`DocumentStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mh_domain::error::{Error, Result};

use crate::document::{DocumentStore, Filter};

pub const DIARY_COLLECTION: &str = "diary_entries";
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// May contain HTML from a rich-text editor.
    pub content: String,
    pub date: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub mood: String,
    pub analysis: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDiaryEntry {
    pub id: String,
    pub content: String,
    pub date: String,
    pub user_id: String,
    pub mood: String,
    pub analysis: String,
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
}

/// Diary persistence for all users.
#[derive(Clone)]
pub struct DiaryBook {
    store: Arc<dyn DocumentStore>,
}

impl DiaryBook {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Persist an entry together with its mood analysis.
    pub fn store(&self, entry: DiaryEntry, analysis: MoodAnalysis) -> Result<StoredDiaryEntry> {
        let stored = StoredDiaryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            content: entry.content,
            date: entry.date,
            user_id: entry.user_id,
            mood: analysis.mood,
            analysis: analysis.analysis,
            confidence: analysis.confidence,
            created_at: Utc::now(),
        };

        let mut record = serde_json::to_value(&stored)?;
        // Searchable text without markup.
        record["search_text"] = serde_json::Value::String(strip_tags(&stored.content));
        self.store.put(DIARY_COLLECTION, &stored.id, record)?;

        tracing::info!(
            user_id = %stored.user_id,
            entry_id = %stored.id,
            mood = %stored.mood,
            "diary entry stored"
        );
        Ok(stored)
    }

    /// Keyword search over a user's entries, newest first.
    ///
    /// A blank query or `recent` lists the latest entries.
    pub fn search(&self, user_id: &str, query: &str, limit: usize) -> Result<Vec<StoredDiaryEntry>> {
        let query = query.trim();
        let query = if query.eq_ignore_ascii_case("recent") { "" } else { query };
        let filter = Filter::new()
            .eq("user_id", user_id)
            .text("search_text", query)
            .newest_first("created_at")
            .limit(limit);

        self.store
            .get(DIARY_COLLECTION, &filter)?
            .into_iter()
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| Error::Persistence(format!("corrupt diary record: {e}")))
            })
            .collect()
    }
}

/// Remove `<...>` markup and collapse whitespace.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocumentStore;

    fn book() -> DiaryBook {
        DiaryBook::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn entry(user: &str, content: &str) -> DiaryEntry {
        DiaryEntry {
            content: content.into(),
            date: "2024-06-01".into(),
            user_id: user.into(),
        }
    }

    fn analysis(mood: &str) -> MoodAnalysis {
        MoodAnalysis {
            mood: mood.into(),
            analysis: "steady".into(),
            confidence: 0.7,
        }
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(
            strip_tags("<p>Slept <b>badly</b></p><img src=\"x.png\">"),
            "Slept badly"
        );
    }

    #[test]
    fn search_is_scoped_to_user() {
        let book = book();
        book.store(entry("u1", "<p>Exam stress all day</p>"), analysis("anxious"))
            .unwrap();
        book.store(entry("u2", "exam went fine"), analysis("happy"))
            .unwrap();

        let hits = book.search("u1", "exam", DEFAULT_SEARCH_LIMIT).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mood, "anxious");
        assert!(hits[0].content.contains("<p>"));
    }

    #[test]
    fn recent_lists_latest_entries() {
        let book = book();
        for i in 0..4 {
            book.store(entry("u1", &format!("day {i}")), analysis("calm"))
                .unwrap();
        }
        let hits = book.search("u1", "recent", 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].created_at >= hits[1].created_at);
    }

    #[test]
    fn no_match_is_empty() {
        let book = book();
        book.store(entry("u1", "quiet evening"), analysis("calm"))
            .unwrap();
        assert!(book.search("u1", "marathon", 5).unwrap().is_empty());
    }
}
