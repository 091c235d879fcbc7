//! Embedded SQLite store for the archivist ingest engine.
//!
//! Owns schema, indexes, full-text search and transactions for every
//! persistent entity the engine knows about: Message, Attachment, Reaction,
//! Edit, Event (with ThinkingBlock/UsageStats satellites), Session, and the
//! ScannerState key/value bag. No other crate touches the database file
//! directly.

mod error;
mod queries;
mod records;
mod schema;
mod store;

pub use error::{Error, Result};
pub use records::{
    EventBatchResult, EventFilter, EventSessionSummary, MessageBatchResult, MessageFilter, SessionFilter,
    SessionStats,
};
pub use schema::SCHEMA_VERSION;
pub use store::Store;
