//! Turn execution around the assistant: per-user locking, session load and
//! save, and the per-turn timeout.

pub mod session_lock;
pub mod turn;

pub use turn::{run_turn, TurnError, TurnInput};
