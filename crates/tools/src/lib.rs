//! Retrieval backends the assistant can consult while answering:
//! the built-in knowledge base, web search, encyclopedia, academic
//! search, and video search.

pub mod arxiv;
pub mod backend;
pub mod knowledge;
pub mod registry;
pub mod truncate;
pub mod video;
pub mod web_search;
pub mod wikipedia;

pub use backend::{TextTool, ToolKind, VideoDetails, VideoHit, VideoSearch};
pub use registry::ToolSet;
pub use truncate::truncate_chars;
