//! Conversation history for one user.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use mh_domain::message::{Message, Role};
use mh_domain::state::MoodEntry;
use mh_domain::trace::TraceEvent;

use super::store_error;
use crate::runtime::TurnError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct History {
    pub user_id: String,
    /// Everything but the system persona.
    pub messages: Vec<Message>,
    pub mood_history: Vec<MoodEntry>,
    pub reasoning_visible: bool,
}

pub async fn get_history(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let session = match state.sessions.get(&user_id) {
        Ok(s) => s,
        Err(e) => return store_error(&e),
    };
    let (messages, mood_history, reasoning_visible) = match session {
        Some(s) => (
            s.messages
                .into_iter()
                .filter(|m| m.role != Role::System)
                .collect(),
            s.mood_history,
            s.reasoning_visible,
        ),
        None => (Vec::new(), Vec::new(), state.config.assistant.reasoning_default),
    };
    Json(History {
        user_id,
        messages,
        mood_history,
        reasoning_visible,
    })
    .into_response()
}

/// Evicts the session. Waits for an in-flight turn rather than racing it.
pub async fn clear_history(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    let _permit = match state.session_locks.acquire(&user_id).await {
        Ok(p) => p,
        Err(_) => return TurnError::Busy.into_response(),
    };
    match state.sessions.evict(&user_id) {
        Ok(cleared) => {
            if cleared {
                TraceEvent::SessionEvicted {
                    user_id: user_id.clone(),
                    reason: "cleared".into(),
                }
                .emit();
            }
            Json(serde_json::json!({ "user_id": user_id, "cleared": cleared })).into_response()
        }
        Err(e) => store_error(&e),
    }
}
