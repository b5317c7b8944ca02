use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub oracle_ready: bool,
    pub tools: Vec<&'static str>,
    pub sessions: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        oracle_ready: state.oracle_ready,
        tools: state.assistant.tools().list(),
        sessions: state.sessions.len(),
    })
}
