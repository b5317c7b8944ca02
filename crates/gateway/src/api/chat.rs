//! `POST /v1/chat`: run one turn for a user.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use mh_domain::emotion::EmotionAnalysis;
use mh_domain::media::{annotate_message, MediaEmotion};
use mh_domain::message::Message;
use mh_domain::route::Route;

use super::error_response;
use crate::runtime::{run_turn, TurnInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    /// Facial expression reported by a client-side classifier.
    #[serde(default)]
    pub face_emotion: Option<MediaEmotion>,
    #[serde(default)]
    pub voice_emotion: Option<MediaEmotion>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub user_id: String,
    pub route: Route,
    pub final_message: String,
    /// Messages appended this turn, including reasoning traces.
    pub messages: Vec<Message>,
    pub emotion_analysis: Option<EmotionAnalysis>,
    pub immediate_resources_needed: bool,
}

pub async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    let user_id = body.user_id.trim();
    if user_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "user_id must not be empty");
    }
    if body.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    let message = annotate_message(
        &body.message,
        body.face_emotion.as_ref(),
        body.voice_emotion.as_ref(),
    );
    let input = TurnInput {
        user_id: user_id.to_string(),
        message,
    };

    match run_turn(&state, input).await {
        Ok(outcome) => Json(ChatResponse {
            user_id: user_id.to_string(),
            route: outcome.state.query_route,
            final_message: outcome.final_message,
            messages: outcome.turn_messages,
            emotion_analysis: outcome.state.emotion_analysis.clone(),
            immediate_resources_needed: outcome.state.immediate_resources_needed,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
