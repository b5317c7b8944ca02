pub mod auth;
pub mod chat;
pub mod diary;
pub mod feedback;
pub mod health;
pub mod history;
pub mod insights;
pub mod journal;
pub mod resources;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::runtime::TurnError;
use crate::state::AppState;

/// Build the full API router.
///
/// Routes are split into **public** (no auth required) and **protected**
/// (gated behind the bearer-token middleware when a token is configured).
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/v1/health", get(health::health));

    let protected = Router::new()
        // Conversation
        .route("/v1/chat", post(chat::chat))
        .route(
            "/v1/chat/:user_id/history",
            get(history::get_history).delete(history::clear_history),
        )
        // Directory
        .route("/v1/resources", get(resources::list_resources))
        .route(
            "/v1/emotion-insights/:kind/:emotion",
            get(insights::get_insight),
        )
        // Emotion journal
        .route("/v1/journal", post(journal::add_entry))
        .route("/v1/journal/:user_id", get(journal::get_journal))
        // Diary
        .route("/v1/diary", post(diary::store_entry))
        .route("/v1/diary/analyze", post(diary::analyze_entry))
        .route("/v1/diary/search", get(diary::search_entries))
        // Reply feedback
        .route("/v1/feedback", post(feedback::submit).get(feedback::list))
        .route("/v1/feedback/analytics", get(feedback::analytics))
        .layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}

// ── Error responses ─────────────────────────────────────────────────

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Persistence failures are reported as service-unavailable.
pub(crate) fn store_error(e: &mh_domain::Error) -> Response {
    tracing::error!(error = %e, kind = e.kind(), "storage failure");
    error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
}

impl IntoResponse for TurnError {
    fn into_response(self) -> Response {
        match &self {
            TurnError::Busy => error_response(StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            TurnError::Timeout(_) => error_response(StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            TurnError::Store(e) => store_error(e),
        }
    }
}
