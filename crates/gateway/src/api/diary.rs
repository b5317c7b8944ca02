//! Diary analysis, storage and search.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use mh_assistant::diary::analyze_diary;
use mh_sessions::diary::DEFAULT_SEARCH_LIMIT;
use mh_sessions::DiaryEntry;

use super::{error_response, store_error};
use crate::state::AppState;

fn validate(entry: &DiaryEntry) -> Result<(), Response> {
    if entry.user_id.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "user_id must not be empty"));
    }
    if entry.content.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "content must not be empty"));
    }
    Ok(())
}

/// `POST /v1/diary/analyze`
pub async fn analyze_entry(State(state): State<AppState>, Json(entry): Json<DiaryEntry>) -> Response {
    if let Err(resp) = validate(&entry) {
        return resp;
    }
    Json(analyze_diary(state.oracle.as_ref(), &entry).await).into_response()
}

/// `POST /v1/diary`: analyze, then store with the analysis attached.
pub async fn store_entry(State(state): State<AppState>, Json(entry): Json<DiaryEntry>) -> Response {
    if let Err(resp) = validate(&entry) {
        return resp;
    }
    let analysis = analyze_diary(state.oracle.as_ref(), &entry).await;
    match state.diary.store(entry, analysis) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(e) => store_error(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub user_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /v1/diary/search?user_id&query&limit`
pub async fn search_entries(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Response {
    let limit = q.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, 50);
    match state.diary.search(&q.user_id, &q.query, limit) {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => store_error(&e),
    }
}
