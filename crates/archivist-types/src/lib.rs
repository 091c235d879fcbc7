//! Core data model, identity derivation and content hashing shared by every
//! other `archivist-*` crate. Contains no I/O.

pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod session;
pub mod timestamp;

pub use error::{Error, Result};
pub use event::{Event, EventType, ThinkingBlock, UsageStats};
pub use message::{Attachment, ContentType, Direction, Edit, Message, Reaction};
pub use session::{Session, SessionStatus, SessionType};
