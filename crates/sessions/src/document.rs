//! Generic keyed document storage: `put(collection, id, record)` and
//! `get(collection, filter)`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use parking_lot::RwLock;
use serde_json::Value;

use mh_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Filter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Record selection for [`DocumentStore::get`].
#[derive(Debug, Clone, Default)]
pub struct Filter {
    equals: Vec<(String, Value)>,
    text: Option<(String, Vec<String>)>,
    order_desc_by: Option<String>,
    limit: Option<usize>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records whose `field` equals `value`.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.equals.push((field.to_string(), value.into()));
        self
    }

    /// Keep records whose string `field` contains any whitespace-separated
    /// term of `query` (case-insensitive). A blank query matches everything.
    pub fn text(mut self, field: &str, query: &str) -> Self {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_lowercase())
            .collect();
        if !terms.is_empty() {
            self.text = Some((field.to_string(), terms));
        }
        self
    }

    /// Sort results descending by a string field. RFC 3339 timestamps are
    /// compared as instants, other strings lexically.
    pub fn newest_first(mut self, field: &str) -> Self {
        self.order_desc_by = Some(field.to_string());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    fn matches(&self, record: &Value) -> bool {
        let eq_ok = self
            .equals
            .iter()
            .all(|(field, value)| record.get(field) == Some(value));
        if !eq_ok {
            return false;
        }
        match &self.text {
            None => true,
            Some((field, terms)) => {
                let haystack = record
                    .get(field)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_lowercase();
                terms.iter().any(|t| haystack.contains(t.as_str()))
            }
        }
    }

    /// Apply match, ordering and limit to an iterator of records.
    fn select<'a>(&self, records: impl Iterator<Item = &'a Value>) -> Vec<Value> {
        let mut out: Vec<Value> = records.filter(|r| self.matches(r)).cloned().collect();
        if let Some(field) = &self.order_desc_by {
            out.sort_by(|a, b| {
                let ka = a.get(field).and_then(|v| v.as_str()).unwrap_or("");
                let kb = b.get(field).and_then(|v| v.as_str()).unwrap_or("");
                match (
                    DateTime::parse_from_rfc3339(ka),
                    DateTime::parse_from_rfc3339(kb),
                ) {
                    (Ok(ta), Ok(tb)) => tb.cmp(&ta),
                    _ => kb.cmp(ka),
                }
            });
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub trait DocumentStore: Send + Sync {
    /// Insert or replace a record.
    fn put(&self, collection: &str, id: &str, record: Value) -> Result<()>;

    /// Records of `collection` selected by `filter`.
    fn get(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;
}

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn put(&self, collection: &str, id: &str, record: Value) -> Result<()> {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    fn get(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|c| filter.select(c.values()))
            .unwrap_or_default())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON file backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One JSON file per collection under `state_path/documents/`.
pub struct FileDocumentStore {
    dir: PathBuf,
    collections: RwLock<Collections>,
}

impl FileDocumentStore {
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("documents");
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::Persistence(format!("creating {}: {e}", dir.display())))?;

        let mut collections = Collections::new();
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::Persistence(format!("listing {}: {e}", dir.display())))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| Error::Persistence(format!("reading {}: {e}", path.display())))?;
            match serde_json::from_str(&raw) {
                Ok(records) => {
                    collections.insert(name.to_string(), records);
                }
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "skipping unreadable document collection"
                ),
            }
        }

        tracing::info!(
            collections = collections.len(),
            path = %dir.display(),
            "document store loaded"
        );

        Ok(Self {
            dir,
            collections: RwLock::new(collections),
        })
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Persistence(format!(
                "invalid collection name: {collection:?}"
            )));
        }
        Ok(self.dir.join(format!("{collection}.json")))
    }
}

impl DocumentStore for FileDocumentStore {
    fn put(&self, collection: &str, id: &str, record: Value) -> Result<()> {
        let path = self.collection_path(collection)?;
        let mut collections = self.collections.write();
        let records = collections.entry(collection.to_string()).or_default();
        records.insert(id.to_string(), record);

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::Persistence(format!("serializing {collection}: {e}")))?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| Error::Persistence(format!("writing {}: {e}", path.display())))
    }

    fn get(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|c| filter.select(c.values()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seed(store: &dyn DocumentStore) {
        store
            .put("notes", "1", json!({"user_id": "u1", "content": "Felt anxious at work", "created_at": "2024-01-01T09:00:00Z"}))
            .unwrap();
        store
            .put("notes", "2", json!({"user_id": "u1", "content": "A calm walk in the park", "created_at": "2024-01-02T09:00:00Z"}))
            .unwrap();
        store
            .put("notes", "3", json!({"user_id": "u2", "content": "Anxious again", "created_at": "2024-01-03T09:00:00Z"}))
            .unwrap();
    }

    #[test]
    fn filter_by_equality_and_text() {
        let store = MemoryDocumentStore::new();
        seed(&store);
        let hits = store
            .get("notes", &Filter::new().eq("user_id", "u1").text("content", "ANXIOUS"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["content"], "Felt anxious at work");
    }

    #[test]
    fn blank_query_returns_newest_first_with_limit() {
        let store = MemoryDocumentStore::new();
        seed(&store);
        let hits = store
            .get(
                "notes",
                &Filter::new()
                    .eq("user_id", "u1")
                    .text("content", "   ")
                    .newest_first("created_at")
                    .limit(1),
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["content"], "A calm walk in the park");
    }

    #[test]
    fn unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.get("missing", &Filter::new()).unwrap().is_empty());
    }

    #[test]
    fn file_store_reloads_records() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileDocumentStore::new(dir.path()).unwrap();
            seed(&store);
        }
        let store = FileDocumentStore::new(dir.path()).unwrap();
        let all = store.get("notes", &Filter::new()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn file_store_rejects_path_like_collection_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path()).unwrap();
        let err = store.put("../escape", "1", json!({})).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
