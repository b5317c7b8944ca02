use std::sync::Arc;
use std::time::Instant;

use mh_assistant::Assistant;
use mh_domain::config::Config;
use mh_providers::Oracle;
use mh_sessions::{DiaryBook, EmotionJournal, FeedbackLog, SessionStore};

use crate::runtime::session_lock::SessionLockMap;

/// Shared application state passed to all API handlers and CLI commands.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub assistant: Arc<Assistant>,
    /// The same oracle the assistant uses, for diary analysis.
    pub oracle: Arc<dyn Oracle>,
    /// Whether a real LLM provider backs the oracle.
    pub oracle_ready: bool,

    // ── Per-user records ──────────────────────────────────────────────
    pub sessions: Arc<dyn SessionStore>,
    pub session_locks: Arc<SessionLockMap>,
    pub journal: Arc<EmotionJournal>,
    pub diary: DiaryBook,
    pub feedback: Arc<FeedbackLog>,

    // ── Security ──────────────────────────────────────────────────────
    /// SHA-256 of the API token; `None` disables auth (dev mode).
    pub api_token_hash: Option<Vec<u8>>,

    pub started_at: Instant,
}
