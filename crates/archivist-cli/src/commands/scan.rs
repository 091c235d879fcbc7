use std::path::PathBuf;

use archivist_scanner::{default_agents_root, default_cron_root, scan as run_scan, ScanMode, ScanOptions, ScanProgress, ScanReport};
use archivist_store::Store;

use crate::error::Error;
use crate::Result;

/// Runs `archivist scan` (spec §4.5/§6). With no `--scan-dir` override this
/// covers both standard roots (`agents/*/sessions` and `cron/runs`) in one
/// invocation, merging their counters; `--scan-dir` narrows to exactly one
/// root, which is also how bulk session backfill (`import sessions`) reuses
/// this same code path.
pub fn run(store: &Store, state_dir: &std::path::Path, mode: &str, force: bool, scan_dir: Option<PathBuf>, dry_run: bool, json: bool) -> Result<()> {
    let mode = ScanMode::from_str(mode)
        .ok_or_else(|| Error::Usage(format!("unknown --mode '{mode}' (expected messages|events|sessions|both|all)")))?;

    let mut report = ScanReport::default();
    let roots: Vec<PathBuf> = match scan_dir {
        Some(dir) => vec![dir],
        None => vec![default_agents_root(state_dir), default_cron_root(state_dir)],
    };

    for root in roots {
        let options = ScanOptions { root, mode, force, dry_run };
        let mut on_progress = |event: ScanProgress<'_>| {
            if json {
                return;
            }
            match event {
                ScanProgress::FacetStarted { facet } => println!("-- scanning {facet} --"),
                ScanProgress::FileFailed { path, message } => {
                    eprintln!("archivist: {} failed: {}", path.display(), message)
                }
                ScanProgress::FileSkippedUnchanged { .. } | ScanProgress::FileProcessed { .. } | ScanProgress::FacetFinished { .. } => {}
            }
        };
        let partial = run_scan(store, &options, &mut on_progress)?;
        merge(&mut report, partial);
    }

    if json {
        crate::output::print_json(&ScanReportView::from(&report));
    } else {
        println!(
            "files: {} discovered, {} skipped (unchanged), {} failed",
            report.files_discovered, report.files_skipped_unchanged, report.files_failed
        );
        println!("messages: {} inserted, {} skipped", report.messages.inserted, report.messages.skipped);
        println!(
            "events: {} inserted, {} skipped, {} errors",
            report.events.inserted, report.events.skipped, report.events.errors
        );
        if report.sessions_upserted > 0 {
            println!("sessions: {} upserted", report.sessions_upserted);
        }
    }

    Ok(())
}

fn merge(into: &mut ScanReport, from: ScanReport) {
    into.files_discovered += from.files_discovered;
    into.files_skipped_unchanged += from.files_skipped_unchanged;
    into.files_failed += from.files_failed;
    into.messages.inserted += from.messages.inserted;
    into.messages.skipped += from.messages.skipped;
    into.events.inserted += from.events.inserted;
    into.events.skipped += from.events.skipped;
    into.events.errors += from.events.errors;
    into.sessions_upserted += from.sessions_upserted;
}

#[derive(serde::Serialize)]
struct ScanReportView {
    files_discovered: usize,
    files_skipped_unchanged: usize,
    files_failed: usize,
    messages_inserted: usize,
    messages_skipped: usize,
    events_inserted: usize,
    events_skipped: usize,
    events_errors: usize,
    sessions_upserted: usize,
}

impl From<&ScanReport> for ScanReportView {
    fn from(r: &ScanReport) -> Self {
        ScanReportView {
            files_discovered: r.files_discovered,
            files_skipped_unchanged: r.files_skipped_unchanged,
            files_failed: r.files_failed,
            messages_inserted: r.messages.inserted,
            messages_skipped: r.messages.skipped,
            events_inserted: r.events.inserted,
            events_skipped: r.events.skipped,
            events_errors: r.events.errors,
            sessions_upserted: r.sessions_upserted,
        }
    }
}
