//! Strategy handlers, one per specialized route.
//!
//! Each handler reads the session state and returns a [`StateDelta`].
//! Oracle failures are absorbed locally with fixed fallback content.
//!
//! [`StateDelta`]: mh_domain::state::StateDelta

pub mod cbt;
pub mod conversational;
pub mod mood;
pub mod psychoeducation;
pub mod resources;
pub mod self_care;
pub mod story;
