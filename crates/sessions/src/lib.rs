//! Per-user persistence for the assistant.
//!
//! Bounded session-state storage with least-recently-used eviction, a
//! generic document store, the media emotion journal, diary storage and
//! reply feedback.

pub mod diary;
pub mod document;
pub mod feedback;
pub mod journal;
pub mod store;

pub use diary::{DiaryBook, DiaryEntry, MoodAnalysis, StoredDiaryEntry};
pub use document::{DocumentStore, FileDocumentStore, Filter, MemoryDocumentStore};
pub use feedback::{FeedbackAnalytics, FeedbackEntry, FeedbackLog, MessageId};
pub use journal::{EmotionJournal, JournalEntry, JournalPatterns, JournalSource};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
