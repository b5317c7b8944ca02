//! Reply ratings: submit, list and summarize.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use mh_sessions::{FeedbackAnalytics, FeedbackEntry};

use super::error_response;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// `0` returns every stored entry.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackList {
    pub feedback: Vec<FeedbackEntry>,
}

/// `POST /v1/feedback`
pub async fn submit(State(state): State<AppState>, Json(entry): Json<FeedbackEntry>) -> Response {
    if entry.user_id.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "user_id must not be empty");
    }
    tracing::debug!(user_id = %entry.user_id, helpful = entry.helpful, "feedback received");
    state.feedback.submit(entry);
    Json(serde_json::json!({
        "status": "success",
        "message": "Feedback submitted successfully",
    }))
    .into_response()
}

/// `GET /v1/feedback?limit`
pub async fn list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Json<FeedbackList> {
    Json(FeedbackList {
        feedback: state.feedback.recent(q.limit.unwrap_or(DEFAULT_LIMIT)),
    })
}

/// `GET /v1/feedback/analytics`
pub async fn analytics(State(state): State<AppState>) -> Json<FeedbackAnalytics> {
    Json(state.feedback.analytics())
}
