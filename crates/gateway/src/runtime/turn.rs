//! One conversational turn for one user.

use std::time::Duration;

use mh_assistant::TurnOutcome;
use mh_domain::trace::TraceEvent;

use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("session is busy; a turn is already in progress")]
    Busy,
    #[error("turn exceeded {0}s")]
    Timeout(u64),
    #[error(transparent)]
    Store(#[from] mh_domain::Error),
}

/// Input to a single turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub user_id: String,
    /// Message text, already annotated with any media emotion context.
    pub message: String,
}

/// Lock the user, load their session, run the assistant under the
/// configured timeout and persist the resulting state.
///
/// A timed-out turn leaves the stored session untouched.
pub async fn run_turn(state: &AppState, input: TurnInput) -> Result<TurnOutcome, TurnError> {
    let _permit = state
        .session_locks
        .acquire(&input.user_id)
        .await
        .map_err(|_| TurnError::Busy)?;

    let prior = state.sessions.get(&input.user_id)?;
    TraceEvent::SessionLoaded {
        user_id: input.user_id.clone(),
        is_new: prior.is_none(),
    }
    .emit();

    let secs = state.config.server.turn_timeout_secs;
    let outcome = tokio::time::timeout(
        Duration::from_secs(secs),
        state.assistant.process_turn(&input.message, prior),
    )
    .await
    .map_err(|_| {
        tracing::warn!(user_id = %input.user_id, timeout_secs = secs, "turn timed out");
        TurnError::Timeout(secs)
    })?;

    state.sessions.put(&input.user_id, outcome.state.clone())?;
    Ok(outcome)
}
