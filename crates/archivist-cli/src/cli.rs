use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Local conversation-and-event archival system: ingest event-log files into
/// the embedded store, then list/search/export what's been archived.
#[derive(Parser)]
#[command(name = "archivist", version, about)]
pub struct Cli {
    /// Overrides the state directory (default: $ARCHIVIST_PATH, then the
    /// platform data directory, then ~/.archivist).
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Emit machine-readable JSON instead of a human-readable report.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the state directory and store, then run an initial scan.
    Init {
        /// Ignore any existing watermark and re-scan everything.
        #[arg(long)]
        refresh: bool,
    },

    /// Discover event-log files under the scan root and ingest new events
    /// into the store (spec §4.5/§6).
    Scan {
        /// Which facet(s) to populate.
        #[arg(long, default_value = "messages")]
        mode: String,

        /// Ignore watermarks and the unchanged-file skip; suspends
        /// foreign-key enforcement per batch for historical backfill.
        #[arg(long)]
        force: bool,

        /// Overrides the scan root (default: `<state-dir>/agents/*` and
        /// `<state-dir>/cron/runs`).
        #[arg(long)]
        scan_dir: Option<PathBuf>,

        /// Parse and report without committing anything to the store.
        #[arg(long)]
        dry_run: bool,
    },

    /// List archived sessions or messages.
    List {
        #[command(subcommand)]
        entity: ListCommand,
    },

    /// Inspect one session: full replay, stats, or export.
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Full-text search over archived message content (or session
    /// title+summary with `--sessions`).
    Search {
        query: String,

        #[arg(long, default_value_t = 20)]
        limit: i64,

        #[arg(long)]
        sessions: bool,
    },

    /// Backfill messages from a third-party chat export or a bulk
    /// event-log directory (spec §4.4).
    Import {
        #[command(subcommand)]
        source: ImportCommand,
    },

    /// Read-only validation of the scan root: unreadable files, malformed
    /// line counts, orphaned `.lock` files. Writes nothing to the store.
    Doctor {
        #[arg(long)]
        scan_dir: Option<PathBuf>,
    },

    /// Explicit store maintenance operations (spec §4.1, invariant I6).
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommand,
    },

    /// Read or write one ScannerState entry directly.
    Checkpoint {
        key: String,
        /// When omitted, reads and prints the current value.
        value: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ListCommand {
    /// Sessions grouped off the events table, enriched with any upserted
    /// Session row's title/status (spec §4.6 `list_sessions`).
    Sessions {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Messages, newest first, with the usual filter set (spec §4.1
    /// `query_messages`).
    Messages {
        #[arg(long)]
        session_key: Option<String>,
        #[arg(long)]
        channel: Option<String>,
        #[arg(long)]
        sender: Option<String>,
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        until: Option<String>,
        /// Full-text MATCH filter (combinable with --include-deleted).
        #[arg(long)]
        content_match: Option<String>,
        #[arg(long)]
        include_deleted: bool,
        #[arg(long, default_value_t = 50)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Session row + computed stats + full event replay.
    Show {
        id: String,
        #[arg(long)]
        include_thinking: bool,
        #[arg(long)]
        include_usage: bool,
    },

    /// Reconstructed transcript in one of five formats (spec §4.6).
    Export {
        id: String,
        #[arg(long, default_value = "jsonl")]
        format: String,
        /// Writes to this path instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ImportCommand {
    /// Telegram JSON export.
    Telegram { path: PathBuf },
    /// WhatsApp "export chat" plain-text file.
    Whatsapp { path: PathBuf },
    /// Discord JSON export.
    Discord { path: PathBuf },
    /// Bulk re-ingest of internal event-log files under `path`, funneled
    /// through the ordinary scan path with dedup on (spec §4.4).
    Sessions { path: PathBuf },
}

#[derive(Subcommand)]
pub enum MaintenanceCommand {
    /// Reclaims space after soft-deletes/dedup-skipped rows accumulate.
    Vacuum,
    /// Recomputes `message_count`/`event_count` for one or all sessions
    /// from the Event table (invariant I6).
    RefreshCounts {
        #[arg(long)]
        session: Option<String>,
    },
}
