//! AppState construction shared by `serve`, `run` and `chat`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use sha2::{Digest, Sha256};

use mh_assistant::Assistant;
use mh_domain::config::{Config, ConfigSeverity, StorageBackend, ORACLE_ROLE};
use mh_providers::{LlmOracle, NullOracle, Oracle, ProviderRegistry};
use mh_sessions::{
    DiaryBook, DocumentStore, EmotionJournal, FeedbackLog, FileDocumentStore, FileSessionStore,
    MemoryDocumentStore, MemorySessionStore, SessionStore,
};
use mh_tools::ToolSet;

use crate::runtime::session_lock::SessionLockMap;
use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let error_count = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if error_count > 0 {
        anyhow::bail!("config validation failed with {error_count} error(s)");
    }

    // ── Oracle ───────────────────────────────────────────────────────
    let registry = ProviderRegistry::from_config(&config.llm);
    let (oracle, oracle_ready): (Arc<dyn Oracle>, bool) =
        match LlmOracle::from_registry(&registry, ORACLE_ROLE) {
            Some(o) => (Arc::new(o.with_temperature(config.llm.temperature)), true),
            None => {
                tracing::warn!("no oracle provider resolved; every stage will use fallback content");
                (Arc::new(NullOracle), false)
            }
        };

    // ── Retrieval tools ──────────────────────────────────────────────
    let tools = ToolSet::from_config(&config.tools);

    // ── Storage ──────────────────────────────────────────────────────
    let (sessions, documents): (Arc<dyn SessionStore>, Arc<dyn DocumentStore>) =
        match config.sessions.backend {
            StorageBackend::Memory => (
                Arc::new(MemorySessionStore::new(
                    config.sessions.max_users,
                    config.sessions.max_messages,
                )),
                Arc::new(MemoryDocumentStore::new()),
            ),
            StorageBackend::File => {
                let path = &config.sessions.state_path;
                let sessions = FileSessionStore::new(
                    path,
                    config.sessions.max_users,
                    config.sessions.max_messages,
                )
                .context("initializing session store")?;
                let documents =
                    FileDocumentStore::new(path).context("initializing document store")?;
                (Arc::new(sessions), Arc::new(documents))
            }
        };
    tracing::info!(backend = ?config.sessions.backend, "storage ready");

    let state = assemble(config.clone(), oracle, oracle_ready, tools, sessions, documents);
    if state.api_token_hash.is_none() {
        tracing::warn!(
            env = %config.server.api_token_env,
            "API token not set; protected endpoints are open (dev mode)"
        );
    }
    Ok(state)
}

/// Wire an [`AppState`] from already-built parts. The API token is read
/// from the environment variable named in the config.
pub fn assemble(
    config: Arc<Config>,
    oracle: Arc<dyn Oracle>,
    oracle_ready: bool,
    tools: ToolSet,
    sessions: Arc<dyn SessionStore>,
    documents: Arc<dyn DocumentStore>,
) -> AppState {
    let api_token_hash = std::env::var(&config.server.api_token_env)
        .ok()
        .filter(|t| !t.is_empty())
        .map(|t| Sha256::digest(t.as_bytes()).to_vec());

    let assistant = Arc::new(Assistant::new(
        oracle.clone(),
        tools,
        config.assistant.clone(),
    ));

    AppState {
        assistant,
        oracle,
        oracle_ready,
        sessions,
        session_locks: Arc::new(SessionLockMap::new()),
        journal: Arc::new(EmotionJournal::new(
            config.sessions.journal_entries_per_user,
            config.sessions.max_users,
        )),
        diary: DiaryBook::new(documents),
        feedback: Arc::new(FeedbackLog::new(config.sessions.feedback_entries)),
        api_token_hash,
        started_at: Instant::now(),
        config,
    }
}
