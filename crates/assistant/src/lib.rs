//! The conversational core: one user message in, one assembled reply out.
//!
//! A turn runs a fixed sequence of stages over a [`SessionState`]. Every
//! stage returns a [`StateDelta`] that the orchestrator merges, so stages
//! can be tested in isolation against a scripted oracle.
//!
//! [`SessionState`]: mh_domain::state::SessionState
//! [`StateDelta`]: mh_domain::state::StateDelta

pub mod assembler;
pub mod classifier;
pub mod crisis;
pub mod diary;
pub mod emotion;
pub mod handlers;
pub mod json;
pub mod orchestrator;
pub mod preferences;
pub mod prompts;
pub mod router;
pub mod strategy;
pub mod tools;

mod stage;

pub use orchestrator::{Assistant, TurnOutcome};
pub use stage::StageCtx;
