use std::path::Path;

use archivist_scanner::{run_import, ImportSource};
use archivist_store::Store;

use crate::output::print_json;
use crate::Result;

/// `archivist import {telegram,whatsapp,discord}` (spec §4.4) and
/// `archivist import sessions` (bulk internal event-log backfill, funneled
/// through the ordinary scan path with dedup on rather than through an
/// Import Parser of its own).
pub fn run(store: &Store, state_dir: &Path, source: &str, path: &Path, json: bool) -> Result<()> {
    if source == "sessions" {
        return super::scan(store, state_dir, "all", false, Some(path.to_path_buf()), false, json);
    }

    let import_source = match source {
        "telegram" => ImportSource::Telegram,
        "whatsapp" => ImportSource::WhatsApp,
        "discord" => ImportSource::Discord,
        other => return Err(crate::error::Error::Usage(format!("unknown import source '{other}'"))),
    };

    let summary = run_import(store, import_source, path)?;
    if json {
        print_json(&summary);
    } else {
        println!(
            "{}: {} inserted, {} skipped ({})",
            summary.source, summary.inserted, summary.skipped, summary.path
        );
    }
    Ok(())
}
