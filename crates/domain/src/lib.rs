pub mod classification;
pub mod config;
pub mod emotion;
pub mod error;
pub mod media;
pub mod message;
pub mod route;
pub mod state;
pub mod trace;

pub use error::{Error, Result};
