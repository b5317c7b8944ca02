//! Per-user session-state store.
//!
//! Both backends keep at most `max_users` sessions and evict the least
//! recently used one when a new user arrives. The file backend mirrors the
//! in-memory map to `sessions/sessions.json` under the state path after
//! every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use mh_domain::error::{Error, Result};
use mh_domain::state::SessionState;
use mh_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Storage for `SessionState` keyed by user id.
pub trait SessionStore: Send + Sync {
    /// Load a user's state and mark it as recently used.
    fn get(&self, user_id: &str) -> Result<Option<SessionState>>;

    /// Insert or replace a user's state, evicting the least recently used
    /// session when the store is full.
    fn put(&self, user_id: &str, state: SessionState) -> Result<()>;

    /// Remove a user's state. Returns whether it existed.
    fn evict(&self, user_id: &str) -> Result<bool>;

    /// Number of stored sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LRU core
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    state: SessionState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    last_access: u64,
}

#[derive(Debug, Clone)]
struct Lru {
    capacity: usize,
    max_messages: usize,
    clock: u64,
    entries: HashMap<String, StoredSession>,
}

impl Lru {
    fn new(capacity: usize, max_messages: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            max_messages,
            clock: 0,
            entries: HashMap::new(),
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn get(&mut self, user_id: &str) -> Option<SessionState> {
        let now = self.tick();
        let entry = self.entries.get_mut(user_id)?;
        entry.last_access = now;
        Some(entry.state.clone())
    }

    /// Returns the ids evicted to make room.
    fn put(&mut self, user_id: &str, mut state: SessionState) -> Vec<String> {
        state.trim_messages(self.max_messages);
        let now = self.tick();
        let ts = Utc::now();
        match self.entries.get_mut(user_id) {
            Some(entry) => {
                entry.state = state;
                entry.updated_at = ts;
                entry.last_access = now;
            }
            None => {
                self.entries.insert(
                    user_id.to_string(),
                    StoredSession {
                        state,
                        created_at: ts,
                        updated_at: ts,
                        last_access: now,
                    },
                );
            }
        }

        let mut evicted = Vec::new();
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .filter(|(id, _)| id.as_str() != user_id)
                .min_by_key(|(_, e)| e.last_access)
                .map(|(id, _)| id.clone());
            match victim {
                Some(id) => {
                    self.entries.remove(&id);
                    evicted.push(id);
                }
                None => break,
            }
        }
        evicted
    }

    fn remove(&mut self, user_id: &str) -> bool {
        self.entries.remove(user_id).is_some()
    }

    /// Rebuild access order from `updated_at` after loading from disk.
    fn restore(&mut self, mut loaded: HashMap<String, StoredSession>) {
        let mut order: Vec<(String, DateTime<Utc>)> = loaded
            .iter()
            .map(|(id, e)| (id.clone(), e.updated_at))
            .collect();
        order.sort_by_key(|(_, ts)| *ts);
        for (id, _) in order {
            let now = self.tick();
            if let Some(e) = loaded.get_mut(&id) {
                e.last_access = now;
            }
        }
        self.entries = loaded;
        // A lowered max_users takes effect on load.
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(id, _)| id.clone());
            if let Some(id) = victim {
                self.entries.remove(&id);
            }
        }
    }
}

fn report_evictions(evicted: Vec<String>) {
    for user_id in evicted {
        TraceEvent::SessionEvicted {
            user_id,
            reason: "capacity".into(),
        }
        .emit();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bounded in-process store. State is lost on restart.
pub struct MemorySessionStore {
    inner: Mutex<Lru>,
}

impl MemorySessionStore {
    pub fn new(max_users: usize, max_messages: usize) -> Self {
        Self {
            inner: Mutex::new(Lru::new(max_users, max_messages)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user_id: &str) -> Result<Option<SessionState>> {
        Ok(self.inner.lock().get(user_id))
    }

    fn put(&self, user_id: &str, state: SessionState) -> Result<()> {
        let evicted = self.inner.lock().put(user_id, state);
        report_evictions(evicted);
        Ok(())
    }

    fn evict(&self, user_id: &str) -> Result<bool> {
        Ok(self.inner.lock().remove(user_id))
    }

    fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON file backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bounded store persisted to `state_path/sessions/sessions.json`.
pub struct FileSessionStore {
    sessions_path: PathBuf,
    inner: Mutex<Lru>,
}

impl FileSessionStore {
    /// Load or create the session store under `state_path`.
    pub fn new(state_path: &Path, max_users: usize, max_messages: usize) -> Result<Self> {
        let dir = state_path.join("sessions");
        std::fs::create_dir_all(&dir).map_err(|e| persistence("creating", &dir, e))?;

        let sessions_path = dir.join("sessions.json");
        let mut lru = Lru::new(max_users, max_messages);
        if sessions_path.exists() {
            let raw = std::fs::read_to_string(&sessions_path)
                .map_err(|e| persistence("reading", &sessions_path, e))?;
            match serde_json::from_str::<HashMap<String, StoredSession>>(&raw) {
                Ok(loaded) => lru.restore(loaded),
                Err(e) => tracing::warn!(
                    path = %sessions_path.display(),
                    error = %e,
                    "session file unreadable, starting empty"
                ),
            }
        }

        tracing::info!(
            sessions = lru.entries.len(),
            path = %sessions_path.display(),
            "session store loaded"
        );

        Ok(Self {
            sessions_path,
            inner: Mutex::new(lru),
        })
    }

    /// Write the map to a sibling temp file and rename it into place.
    fn write_locked(&self, lru: &Lru) -> Result<()> {
        let json = serde_json::to_string_pretty(&lru.entries)
            .map_err(|e| Error::Persistence(format!("serializing sessions: {e}")))?;
        let tmp = self.sessions_path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| persistence("writing", &tmp, e))?;
        std::fs::rename(&tmp, &self.sessions_path)
            .map_err(|e| persistence("replacing", &self.sessions_path, e))?;
        Ok(())
    }

    /// Persist the current map to disk.
    pub fn flush(&self) -> Result<()> {
        let lru = self.inner.lock();
        self.write_locked(&lru)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, user_id: &str) -> Result<Option<SessionState>> {
        Ok(self.inner.lock().get(user_id))
    }

    /// Memory only changes once the file write has succeeded.
    fn put(&self, user_id: &str, state: SessionState) -> Result<()> {
        let evicted = {
            let mut lru = self.inner.lock();
            let mut next = lru.clone();
            let evicted = next.put(user_id, state);
            self.write_locked(&next)?;
            *lru = next;
            evicted
        };
        report_evictions(evicted);
        Ok(())
    }

    fn evict(&self, user_id: &str) -> Result<bool> {
        let mut lru = self.inner.lock();
        if !lru.entries.contains_key(user_id) {
            return Ok(false);
        }
        let mut next = lru.clone();
        next.remove(user_id);
        self.write_locked(&next)?;
        *lru = next;
        Ok(true)
    }

    fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

fn persistence(action: &str, path: &Path, e: std::io::Error) -> Error {
    Error::Persistence(format!("{action} {}: {e}", path.display()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::message::Message;

    fn state(tag: &str) -> SessionState {
        let mut s = SessionState::new("persona", true);
        s.messages.push(Message::user(tag));
        s
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new(10, 100);
        assert!(store.get("alice").unwrap().is_none());
        store.put("alice", state("hello")).unwrap();
        let loaded = store.get("alice").unwrap().unwrap();
        assert_eq!(loaded.last_user_message(), Some("hello"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let store = MemorySessionStore::new(2, 100);
        store.put("a", state("1")).unwrap();
        store.put("b", state("2")).unwrap();
        // Touch "a" so "b" becomes the oldest.
        store.get("a").unwrap();
        store.put("c", state("3")).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("a").unwrap().is_some());
        assert!(store.get("b").unwrap().is_none());
        assert!(store.get("c").unwrap().is_some());
    }

    #[test]
    fn evict_removes_session() {
        let store = MemorySessionStore::new(2, 100);
        store.put("a", state("1")).unwrap();
        assert!(store.evict("a").unwrap());
        assert!(!store.evict("a").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn put_trims_messages() {
        let store = MemorySessionStore::new(2, 3);
        let mut s = state("first");
        for i in 0..10 {
            s.messages.push(Message::assistant(format!("reply {i}")));
        }
        store.put("a", s).unwrap();
        let loaded = store.get("a").unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 3);
        assert_eq!(loaded.messages[0].content, "persona");
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
            store.put("alice", state("remember me")).unwrap();
        }
        let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
        let loaded = store.get("alice").unwrap().unwrap();
        assert_eq!(loaded.last_user_message(), Some("remember me"));
    }

    #[test]
    fn file_store_applies_lower_capacity_on_load() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
            for id in ["a", "b", "c"] {
                store.put(id, state(id)).unwrap();
            }
        }
        let store = FileSessionStore::new(dir.path(), 2, 100).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sessions")).unwrap();
        std::fs::write(dir.path().join("sessions/sessions.json"), "not json").unwrap();
        let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn write_failure_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
        std::fs::remove_dir_all(dir.path().join("sessions")).unwrap();
        let err = store.put("a", state("x")).unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 10, 100).unwrap();
        store.put("a", state("first")).unwrap();

        // A directory where the temp file goes makes every write fail.
        std::fs::create_dir(dir.path().join("sessions").join("sessions.json.tmp")).unwrap();

        assert!(store.put("a", state("second")).is_err());
        assert!(store.put("b", state("new")).is_err());
        assert!(store.evict("a").is_err());

        assert_eq!(store.len(), 1);
        let kept = store.get("a").unwrap().unwrap();
        assert_eq!(kept.last_user_message(), Some("first"));
        assert!(store.get("b").unwrap().is_none());
    }
}
