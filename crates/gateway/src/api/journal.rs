//! Emotion journal: face and voice classifier readings per user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use mh_sessions::{JournalEntry, JournalPatterns, JournalSource};

use super::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddEntryRequest {
    pub user_id: String,
    pub emotion: String,
    pub score: f32,
    #[serde(default)]
    pub note: Option<String>,
    pub source: JournalSource,
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize)]
pub struct JournalView {
    pub user_id: String,
    pub entries: Vec<JournalEntry>,
    /// Present once the user has enough entries.
    pub patterns: Option<JournalPatterns>,
}

pub async fn add_entry(State(state): State<AppState>, Json(body): Json<AddEntryRequest>) -> Response {
    if body.user_id.trim().is_empty() || body.emotion.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "user_id and emotion are required");
    }
    let entry = JournalEntry {
        emotion: body.emotion.trim().to_string(),
        score: body.score,
        note: body.note,
        source: body.source,
        timestamp: body.timestamp,
    };
    Json(state.journal.add(body.user_id.trim(), entry)).into_response()
}

pub async fn get_journal(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<JournalView> {
    Json(JournalView {
        entries: state.journal.entries(&user_id),
        patterns: state.journal.patterns(&user_id),
        user_id,
    })
}
