use std::path::{Path, PathBuf};

use archivist_scanner::{default_agents_root, default_cron_root, enumerate_files};

use crate::output::print_json;
use crate::Result;

/// One file's read-only validation result (SPEC_FULL.md supplemented
/// feature: "archivist doctor-style file validation"). Writes nothing to
/// the store — it only parses each line as JSON and counts what doesn't
/// parse, exactly the condition the Event-log Parser itself tolerates by
/// skipping (spec §4.3/§7).
#[derive(Debug, serde::Serialize)]
struct FileReport {
    path: PathBuf,
    total_lines: usize,
    malformed_lines: usize,
    readable: bool,
}

#[derive(Debug, Default, serde::Serialize)]
struct DoctorReport {
    files: Vec<FileReport>,
    orphaned_locks: Vec<PathBuf>,
}

/// `archivist doctor` (SPEC_FULL.md supplemented feature, grounded in the
/// teacher's `doctor_check`/`doctor_run` handlers, scoped down to what §6/§7
/// already require the core to detect).
pub fn run(state_dir: &Path, scan_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let roots: Vec<PathBuf> = match scan_dir {
        Some(dir) => vec![dir],
        None => vec![default_agents_root(state_dir), default_cron_root(state_dir)],
    };

    let mut report = DoctorReport::default();
    for root in &roots {
        for file in enumerate_files(root)? {
            report.files.push(inspect_file(&file.path));
        }
        report.orphaned_locks.extend(find_orphaned_locks(root)?);
    }

    if json {
        print_json(&report);
        return Ok(());
    }

    if report.files.is_empty() {
        println!("no event-log files found under {}", roots.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "));
    }
    for file in &report.files {
        if !file.readable {
            println!("UNREADABLE  {}", file.path.display());
        } else if file.malformed_lines > 0 {
            println!("{} malformed / {} lines  {}", file.malformed_lines, file.total_lines, file.path.display());
        } else {
            println!("ok  {} lines  {}", file.total_lines, file.path.display());
        }
    }
    for lock in &report.orphaned_locks {
        println!("ORPHANED LOCK  {}", lock.display());
    }
    Ok(())
}

fn inspect_file(path: &Path) -> FileReport {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            return FileReport { path: path.to_path_buf(), total_lines: 0, malformed_lines: 0, readable: false };
        }
    };

    let mut total_lines = 0;
    let mut malformed_lines = 0;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total_lines += 1;
        if serde_json::from_str::<serde_json::Value>(line).is_err() {
            malformed_lines += 1;
        }
    }

    FileReport { path: path.to_path_buf(), total_lines, malformed_lines, readable: true }
}

/// A `.jsonl.lock` whose session file no longer exists is a stale marker
/// from a session that never cleaned up after itself (spec §6: "a sibling
/// `<uuid>.jsonl.lock` marks an active session").
fn find_orphaned_locks(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut orphans = Vec::new();
    for entry in walkdir_lock_files(root)? {
        let session_file = entry.with_extension("");
        if !session_file.exists() {
            orphans.push(entry);
        }
    }
    Ok(orphans)
}

fn walkdir_lock_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.ends_with(".jsonl.lock") {
            out.push(entry.path().to_path_buf());
        }
    }
    Ok(out)
}
