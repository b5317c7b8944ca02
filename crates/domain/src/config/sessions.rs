use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions & storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where per-user session state and documents are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory only; lost on restart.
    #[default]
    Memory,
    /// JSON files under `state_path`.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for file-backed stores.
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    /// Least-recently-used sessions beyond this count are evicted.
    #[serde(default = "d_100")]
    pub max_users: usize,
    /// Messages kept per session when persisting (oldest dropped first,
    /// the leading system message is always kept).
    #[serde(default = "d_200")]
    pub max_messages: usize,
    /// Emotion-journal entries kept per user.
    #[serde(default = "d_30")]
    pub journal_entries_per_user: usize,
    /// Reply ratings kept in the feedback log.
    #[serde(default = "d_100")]
    pub feedback_entries: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            state_path: d_state_path(),
            max_users: 100,
            max_messages: 200,
            journal_entries_per_user: 30,
            feedback_entries: 100,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_100() -> usize {
    100
}
fn d_200() -> usize {
    200
}
fn d_30() -> usize {
    30
}
