use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use archivist_store::{MessageBatchResult, Store};
use archivist_types::Message;

use crate::Result;

/// Outcome of one import run, written to a `ScannerState` entry for later
/// audit (spec §4.4 "each import writes one ScannerState entry recording
/// source, path, count inserted/skipped, and wall-clock time").
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImportSummary {
    pub source: String,
    pub path: String,
    pub inserted: usize,
    pub skipped: usize,
    pub started_at: i64,
    pub finished_at: i64,
}

/// Writes `messages` through the same `insert_messages_batch` path live
/// ingest uses (one duplicate predicate, not two — see DESIGN.md's Open
/// Question note on Stage-3 near-duplicate detection during import), then
/// records the run under the reserved `backfill_<source>_<unix-ms>` key.
pub fn import_messages(
    store: &Store,
    source: &str,
    path: &Path,
    messages: &[Message],
) -> Result<ImportSummary> {
    let started_at = now_millis();
    let MessageBatchResult { inserted, skipped } = store.insert_messages_batch(messages)?;
    let finished_at = now_millis();

    let summary = ImportSummary {
        source: source.to_string(),
        path: path.display().to_string(),
        inserted,
        skipped,
        started_at,
        finished_at,
    };

    let key = format!("backfill_{}_{}", source, finished_at);
    let value = serde_json::to_string(&summary).unwrap_or_default();
    store.checkpoint(&key, Some(&value))?;

    Ok(summary)
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
