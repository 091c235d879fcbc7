//! Import Parsers: third-party chat-export parsers normalized to the
//! archivist `Message` record (spec §4.4). Every parser here writes through
//! the Store's ordinary `insert_messages_batch` path, so the same
//! three-stage duplicate predicate (spec §4.2) governs live ingest and
//! historical backfill alike.
//!
//! The fourth "import parser" named in spec §4.4 — bulk re-ingest of
//! internal event-log files — has no parsing logic of its own; it funnels
//! through `archivist-scanner`'s ordinary file-scan path with
//! `skip_if_exists=true`, which is exactly the Scanner's own backfill mode.

mod common;
mod discord;
mod error;
mod telegram;
mod whatsapp;

pub use common::{import_messages, ImportSummary};
pub use discord::parse_discord_export;
pub use error::{Error, Result};
pub use telegram::parse_telegram_export;
pub use whatsapp::parse_whatsapp_export;
