//! Streams one event-log file into a typed sequence of archive events,
//! synthesizing `tool_call`/`thinking_block`/`usage_stats` children out of
//! fields embedded in parent `message` records (spec §4.3).

mod error;
mod metadata;
mod parser;
pub mod schema;

pub use error::{Error, Result};
pub use metadata::{derive_session_metadata, SessionMetadata};
pub use parser::EventLogParser;
