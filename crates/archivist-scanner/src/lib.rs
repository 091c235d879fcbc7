//! Scanner/Ingestor: discovers event-log files under a state-directory
//! tree, replays them through the Event-log Parser into the Store with
//! checkpointing and duplicate elision, and drives session summarization
//! (spec §4.5). Also owns state-directory/config resolution (ambient stack).

pub mod backfill;
pub mod config;
mod enumerate;
mod error;
mod messages;
pub mod progress;
mod scan;
mod session_key;
mod summarize;

pub use backfill::{run_import, ImportSource};
pub use config::{default_agents_root, default_cron_root, default_store_path, load_config, resolve_state_dir, Config};
pub use enumerate::{enumerate_files, DiscoveredFile};
pub use error::{Error, Result};
pub use messages::{event_to_message, OPENCLAW_CHANNEL};
pub use progress::ScanProgress;
pub use scan::{scan, scan_with_summarizer, ScanMode, ScanOptions, ScanReport};
pub use session_key::{derive_session_key, session_id_from_path, session_type_from_key};
pub use summarize::{LocalFallbackSummarizer, SessionSummaryInput, Summarizer};
