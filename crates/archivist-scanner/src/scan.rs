use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use archivist_parser::{derive_session_metadata, EventLogParser};
use archivist_store::{EventBatchResult, MessageBatchResult, Store};
use archivist_types::{EventType, Message, Session, SessionStatus};

use crate::enumerate::{enumerate_files, DiscoveredFile};
use crate::messages::event_to_message;
use crate::progress::ScanProgress;
use crate::session_key::{derive_session_key, session_id_from_path, session_type_from_key};
use crate::summarize::{LocalFallbackSummarizer, SessionSummaryInput, Summarizer};
use crate::Result;

const WATERMARK_MESSAGES: &str = "last_scan_timestamp";
const WATERMARK_EVENTS: &str = "last_events_scan_timestamp";
const WATERMARK_SESSIONS: &str = "last_sessions_scan_timestamp";

/// Which facet(s) a scan populates (spec §4.5/§6). `Both` = messages+events,
/// `All` = messages+events+sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Messages,
    Events,
    Sessions,
    Both,
    All,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Messages => "messages",
            ScanMode::Events => "events",
            ScanMode::Sessions => "sessions",
            ScanMode::Both => "both",
            ScanMode::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "messages" => ScanMode::Messages,
            "events" => ScanMode::Events,
            "sessions" => ScanMode::Sessions,
            "both" => ScanMode::Both,
            "all" => ScanMode::All,
            _ => return None,
        })
    }

    fn wants_messages(&self) -> bool {
        matches!(self, ScanMode::Messages | ScanMode::Both | ScanMode::All)
    }

    fn wants_events(&self) -> bool {
        matches!(self, ScanMode::Events | ScanMode::Both | ScanMode::All)
    }

    fn wants_sessions(&self) -> bool {
        matches!(self, ScanMode::Sessions | ScanMode::All)
    }
}

/// Inputs to a single `scan` call (spec §4.5/§6).
pub struct ScanOptions {
    pub root: PathBuf,
    pub mode: ScanMode,
    /// Ignore watermarks and the unchanged-file skip; suspends foreign-key
    /// enforcement per batch (spec §4.5, §5 concurrency model).
    pub force: bool,
    /// Parse and report, but write nothing to the Store.
    pub dry_run: bool,
}

/// Aggregate counters returned by `scan` (spec §4.5, §6 exit codes depend on
/// `files_failed` being zero).
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub files_discovered: usize,
    pub files_skipped_unchanged: usize,
    pub files_failed: usize,
    pub messages: MessageBatchResult,
    pub events: EventBatchResult,
    pub sessions_upserted: usize,
}

/// Runs one scan according to `options`, reporting progress through
/// `on_progress`. See spec §4.5 for the five-step algorithm; the facets run
/// in sequence, each maintaining its own ScannerState watermark.
pub fn scan(store: &Store, options: &ScanOptions, mut on_progress: impl FnMut(ScanProgress<'_>)) -> Result<ScanReport> {
    scan_with_summarizer(store, options, &LocalFallbackSummarizer, &mut on_progress)
}

pub fn scan_with_summarizer(
    store: &Store,
    options: &ScanOptions,
    summarizer: &dyn Summarizer,
    on_progress: &mut dyn FnMut(ScanProgress<'_>),
) -> Result<ScanReport> {
    let all_files = enumerate_files(&options.root)?;
    let mut report = ScanReport {
        files_discovered: all_files.len(),
        ..Default::default()
    };

    let active_files = if options.force {
        all_files
    } else {
        partition_unchanged(store, &all_files, &mut report, on_progress)?
    };

    if options.mode.wants_messages() {
        on_progress(ScanProgress::FacetStarted { facet: "messages" });
        run_messages_facet(store, &options.root, &active_files, options, &mut report, on_progress)?;
        on_progress(ScanProgress::FacetFinished { facet: "messages" });
    }
    if options.mode.wants_events() {
        on_progress(ScanProgress::FacetStarted { facet: "events" });
        run_events_facet(store, &options.root, &active_files, options, &mut report, on_progress)?;
        on_progress(ScanProgress::FacetFinished { facet: "events" });
    }
    if options.mode.wants_sessions() {
        on_progress(ScanProgress::FacetStarted { facet: "sessions" });
        run_sessions_facet(store, &options.root, &active_files, options, summarizer, &mut report, on_progress)?;
        on_progress(ScanProgress::FacetFinished { facet: "sessions" });
    }

    if !options.dry_run {
        record_file_states(store, &active_files)?;
    }

    Ok(report)
}

/// Splits `files` into "changed since last scan" (returned) vs "unchanged"
/// (counted in `report.files_skipped_unchanged`), per stored `file_state:*`
/// ScannerState entries holding `"<mtime_ms>:<size_bytes>"` (SPEC_FULL.md
/// supplemented feature: incremental file-unchanged skip).
fn partition_unchanged(
    store: &Store,
    files: &[DiscoveredFile],
    report: &mut ScanReport,
    on_progress: &mut dyn FnMut(ScanProgress<'_>),
) -> Result<Vec<DiscoveredFile>> {
    let mut active = Vec::with_capacity(files.len());
    for file in files {
        let key = file_state_key(&file.path);
        let previous = store.checkpoint(&key, None)?;
        let current = format!("{}:{}", file.modified_ms, file.size_bytes);
        if previous.as_deref() == Some(current.as_str()) {
            report.files_skipped_unchanged += 1;
            on_progress(ScanProgress::FileSkippedUnchanged { path: &file.path });
        } else {
            active.push(file.clone());
        }
    }
    Ok(active)
}

fn record_file_states(store: &Store, files: &[DiscoveredFile]) -> Result<()> {
    for file in files {
        let key = file_state_key(&file.path);
        let value = format!("{}:{}", file.modified_ms, file.size_bytes);
        store.checkpoint(&key, Some(&value))?;
    }
    Ok(())
}

fn file_state_key(path: &Path) -> String {
    format!("file_state:{}", path.display())
}

fn run_messages_facet(
    store: &Store,
    root: &Path,
    files: &[DiscoveredFile],
    options: &ScanOptions,
    report: &mut ScanReport,
    on_progress: &mut dyn FnMut(ScanProgress<'_>),
) -> Result<()> {
    let watermark = if options.force {
        None
    } else {
        store.checkpoint(WATERMARK_MESSAGES, None)?.and_then(|v| v.parse::<i64>().ok())
    };

    for file in files {
        let session_key = derive_session_key(&file.path, root);
        let parsed = match EventLogParser::open(&file.path, watermark) {
            Ok(parser) => parser,
            Err(err) => {
                report.files_failed += 1;
                on_progress(ScanProgress::FileFailed { path: &file.path, message: err.to_string() });
                continue;
            }
        };

        let messages: Vec<Message> = parsed.filter_map(|event| event_to_message(&event, &session_key)).collect();
        if !options.dry_run && !messages.is_empty() {
            let result = store.insert_messages_batch(&messages)?;
            report.messages.inserted += result.inserted;
            report.messages.skipped += result.skipped;
        }
        on_progress(ScanProgress::FileProcessed { path: &file.path });
    }

    if !options.dry_run {
        store.checkpoint(WATERMARK_MESSAGES, Some(&now_millis().to_string()))?;
    }
    Ok(())
}

fn run_events_facet(
    store: &Store,
    root: &Path,
    files: &[DiscoveredFile],
    options: &ScanOptions,
    report: &mut ScanReport,
    on_progress: &mut dyn FnMut(ScanProgress<'_>),
) -> Result<()> {
    let watermark = if options.force {
        None
    } else {
        store.checkpoint(WATERMARK_EVENTS, None)?.and_then(|v| v.parse::<i64>().ok())
    };

    for file in files {
        let session_key = derive_session_key(&file.path, root);
        let session_id = session_id_from_path(&file.path);
        let parsed = match EventLogParser::open(&file.path, watermark) {
            Ok(parser) => parser,
            Err(err) => {
                report.files_failed += 1;
                on_progress(ScanProgress::FileFailed { path: &file.path, message: err.to_string() });
                continue;
            }
        };

        let events: Vec<_> = parsed.collect();
        if !options.dry_run && !events.is_empty() {
            let result = store.insert_events_batch(&events, &session_key, Some(&session_id), options.force)?;
            report.events.inserted += result.inserted;
            report.events.skipped += result.skipped;
            report.events.errors += result.errors;
        }
        on_progress(ScanProgress::FileProcessed { path: &file.path });
    }

    if !options.dry_run {
        store.checkpoint(WATERMARK_EVENTS, Some(&now_millis().to_string()))?;
    }
    Ok(())
}

/// Sessions always replay the whole file: a partial tail can't tell you
/// whether the run is still active, and the aggregate counts (tool calls,
/// errors, first/last timestamp) need every event, not just the new ones.
fn run_sessions_facet(
    store: &Store,
    root: &Path,
    files: &[DiscoveredFile],
    options: &ScanOptions,
    summarizer: &dyn Summarizer,
    report: &mut ScanReport,
    on_progress: &mut dyn FnMut(ScanProgress<'_>),
) -> Result<()> {
    for file in files {
        let session_key = derive_session_key(&file.path, root);
        let session_id = session_id_from_path(&file.path);
        let parsed = match EventLogParser::open(&file.path, None) {
            Ok(parser) => parser,
            Err(err) => {
                report.files_failed += 1;
                on_progress(ScanProgress::FileFailed { path: &file.path, message: err.to_string() });
                continue;
            }
        };
        let events: Vec<_> = parsed.collect();
        let metadata = derive_session_metadata(&events);

        let model = events.iter().find_map(|e| e.model_id.clone());
        let agent_id = session_key
            .strip_prefix("agent:")
            .and_then(|rest| rest.split(':').next())
            .map(|s| s.to_string());
        let status = if metadata.error_count > 0 {
            SessionStatus::Failed
        } else {
            SessionStatus::Completed
        };

        let summary_input = SessionSummaryInput {
            session_id: &session_id,
            session_key: &session_key,
            metadata: &metadata,
        };
        // On any summarizer failure (e.g. a network-backed collaborator
        // erroring out), fall back to the deterministic local label rather
        // than leaving the session untitled (spec §4.5 step 5, §7).
        let (title, summary) = match summarizer
            .summarize(&summary_input)
            .or_else(|| LocalFallbackSummarizer.summarize(&summary_input))
        {
            Some((title, summary)) => (Some(title), Some(summary)),
            None => (None, None),
        };

        let now = now_millis();
        let session = Session {
            id: session_id.clone(),
            session_key: session_key.clone(),
            session_type: session_type_from_key(&session_key),
            // Subagent/isolated parents aren't named inside the child's own
            // log file; linking them needs the parent's tool-call event,
            // which this facet doesn't cross-reference. Left unset.
            parent_session_id: None,
            label: None,
            agent_id,
            model,
            started_at: metadata.first_timestamp.unwrap_or(file.modified_ms),
            ended_at: metadata.last_timestamp,
            status,
            title,
            summary,
            message_count: events
                .iter()
                .filter(|e| matches!(e.event_type, EventType::Message))
                .count() as i64,
            event_count: metadata.event_count as i64,
            created_at: now,
            updated_at: now,
        };

        if !options.dry_run {
            store.upsert_session(&session)?;
            report.sessions_upserted += 1;
        }
        on_progress(ScanProgress::FileProcessed { path: &file.path });
    }

    if !options.dry_run {
        store.checkpoint(WATERMARK_SESSIONS, Some(&now_millis().to_string()))?;
    }
    Ok(())
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_session_file(dir: &Path, agent: &str, id: &str, lines: &[&str]) -> PathBuf {
        let session_dir = dir.join("agents").join(agent).join("sessions");
        fs::create_dir_all(&session_dir).unwrap();
        let path = session_dir.join(format!("{}.jsonl", id));
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn events_mode_ingests_full_fanout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("agents");
        write_session_file(
            dir.path(),
            "main",
            "S1",
            &[r#"{"type":"session","id":"S1","timestamp":"2026-01-01T00:00:00.000Z"}"#,
              r#"{"type":"message","id":"M1","parentId":"S1","timestamp":"2026-01-01T00:00:01.000Z","message":{"role":"assistant","content":[{"type":"text","text":"hi"}],"usage":{"input":1,"output":1,"totalTokens":2}}}"#],
        );

        let store = Store::open_in_memory().unwrap();
        let options = ScanOptions { root, mode: ScanMode::Events, force: false, dry_run: false };
        let report = scan(&store, &options, |_| {}).unwrap();
        assert_eq!(report.files_discovered, 1);
        assert!(report.events.inserted >= 2);
    }

    #[test]
    fn messages_mode_projects_openclaw_channel() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("agents");
        write_session_file(
            dir.path(),
            "main",
            "S1",
            &[r#"{"type":"message","id":"M1","timestamp":"2026-01-01T00:00:01.000Z","message":{"role":"user","content":[{"type":"text","text":"hello"}]}}"#],
        );

        let store = Store::open_in_memory().unwrap();
        let options = ScanOptions { root, mode: ScanMode::Messages, force: false, dry_run: false };
        let report = scan(&store, &options, |_| {}).unwrap();
        assert_eq!(report.messages.inserted, 1);
    }

    #[test]
    fn unchanged_file_is_skipped_on_second_scan() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("agents");
        write_session_file(
            dir.path(),
            "main",
            "S1",
            &[r#"{"type":"message","id":"M1","timestamp":"2026-01-01T00:00:01.000Z","message":{"role":"user","content":[{"type":"text","text":"hello"}]}}"#],
        );

        let store = Store::open_in_memory().unwrap();
        let options = ScanOptions { root, mode: ScanMode::Events, force: false, dry_run: false };
        scan(&store, &options, |_| {}).unwrap();
        let second = scan(&store, &options, |_| {}).unwrap();
        assert_eq!(second.files_skipped_unchanged, 1);
    }

    #[test]
    fn sessions_mode_upserts_with_fallback_summary() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("agents");
        write_session_file(
            dir.path(),
            "main",
            "S1",
            &[r#"{"type":"session","id":"S1","timestamp":"2026-01-01T00:00:00.000Z"}"#,
              r#"{"type":"message","id":"M1","parentId":"S1","timestamp":"2026-01-01T00:00:01.000Z","message":{"role":"assistant","content":[{"type":"text","text":"hi"}]}}"#],
        );

        let store = Store::open_in_memory().unwrap();
        let options = ScanOptions { root, mode: ScanMode::Sessions, force: false, dry_run: false };
        let report = scan(&store, &options, |_| {}).unwrap();
        assert_eq!(report.sessions_upserted, 1);
    }

    struct FailingSummarizer;

    impl Summarizer for FailingSummarizer {
        fn summarize(&self, _input: &SessionSummaryInput<'_>) -> Option<(String, String)> {
            None
        }
    }

    #[test]
    fn sessions_mode_falls_back_to_local_label_on_summarizer_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("agents");
        write_session_file(
            dir.path(),
            "main",
            "S1",
            &[r#"{"type":"session","id":"S1","timestamp":"2026-01-01T00:00:00.000Z"}"#,
              r#"{"type":"message","id":"M1","parentId":"S1","timestamp":"2026-01-01T00:00:01.000Z","message":{"role":"assistant","content":[{"type":"text","text":"hi"}]}}"#],
        );

        let store = Store::open_in_memory().unwrap();
        let options = ScanOptions { root, mode: ScanMode::Sessions, force: false, dry_run: false };
        let mut on_progress = |_: ScanProgress<'_>| {};
        scan_with_summarizer(&store, &options, &FailingSummarizer, &mut on_progress).unwrap();

        let session = store.get_session("S1").unwrap().unwrap();
        assert!(session.title.is_some());
        assert!(session.summary.unwrap().contains("events"));
    }
}
