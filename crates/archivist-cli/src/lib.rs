//! CLI for the archivist ingest-and-archive engine. Thin argument-parsing
//! and dispatch layer over `archivist-scanner`/`archivist-store`/
//! `archivist-query`/`archivist-importers` — it owns no ingestion or query
//! logic of its own.

mod cli;
mod commands;
mod error;
mod output;

pub use cli::Cli;
pub use error::{Error, Result};

use cli::{Commands, ImportCommand, ListCommand, MaintenanceCommand, SessionCommand};

/// Dispatches a parsed [`Cli`] invocation. Every subcommand opens the store
/// itself (rather than up front) so that `--dir` resolution errors surface
/// with the same shape regardless of which subcommand triggered them.
pub fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let dir = cli.dir.as_deref();

    match cli.command {
        Commands::Init { refresh } => commands::init(dir, refresh, json),

        Commands::Scan { mode, force, scan_dir, dry_run } => {
            let (state_dir, store) = commands::open_store(dir)?;
            commands::scan(&store, &state_dir, &mode, force, scan_dir, dry_run, json)
        }

        Commands::List { entity } => {
            let (_, store) = commands::open_store(dir)?;
            match entity {
                ListCommand::Sessions { limit } => commands::list_sessions(&store, limit, json),
                ListCommand::Messages {
                    session_key,
                    channel,
                    sender,
                    since,
                    until,
                    content_match,
                    include_deleted,
                    limit,
                    offset,
                } => commands::list_messages(
                    &store,
                    session_key,
                    channel,
                    sender,
                    since,
                    until,
                    content_match,
                    include_deleted,
                    limit,
                    offset,
                    json,
                ),
            }
        }

        Commands::Session { command } => {
            let (_, store) = commands::open_store(dir)?;
            match command {
                SessionCommand::Show { id, include_thinking, include_usage } => {
                    commands::session_show(&store, &id, include_thinking, include_usage, json)
                }
                SessionCommand::Export { id, format, out } => {
                    commands::session_export(&store, &id, &format, out.as_deref())
                }
            }
        }

        Commands::Search { query, limit, sessions } => {
            let (_, store) = commands::open_store(dir)?;
            commands::search(&store, &query, limit, sessions, json)
        }

        Commands::Import { source } => {
            let (state_dir, store) = commands::open_store(dir)?;
            let (name, path) = match source {
                ImportCommand::Telegram { path } => ("telegram", path),
                ImportCommand::Whatsapp { path } => ("whatsapp", path),
                ImportCommand::Discord { path } => ("discord", path),
                ImportCommand::Sessions { path } => ("sessions", path),
            };
            commands::import(&store, &state_dir, name, &path, json)
        }

        Commands::Doctor { scan_dir } => {
            let (state_dir, _store) = commands::open_store(dir)?;
            commands::doctor(&state_dir, scan_dir, json)
        }

        Commands::Maintenance { command } => {
            let (_, store) = commands::open_store(dir)?;
            match command {
                MaintenanceCommand::Vacuum => commands::vacuum(&store, json),
                MaintenanceCommand::RefreshCounts { session } => {
                    commands::refresh_counts(&store, session.as_deref(), json)
                }
            }
        }

        Commands::Checkpoint { key, value } => {
            let (_, store) = commands::open_store(dir)?;
            commands::checkpoint(&store, &key, value.as_deref(), json)
        }
    }
}
