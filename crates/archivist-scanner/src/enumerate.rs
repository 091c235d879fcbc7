use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::Error;
use crate::Result;

/// One discoverable event-log file under a scan root.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_ms: i64,
}

/// Walks `root` for `*.jsonl` files, skipping lock files and anything
/// marked deleted (spec §4.5 step 1: "skipping `.lock` files and files
/// marked `.deleted.`"). Missing roots are tolerated — a fresh install has
/// no `agents/` directory yet — but an unreadable *existing* root is fatal.
pub fn enumerate_files(root: &Path) -> Result<Vec<DiscoveredFile>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|err| {
            Error::CannotReadRoot(
                root.to_path_buf(),
                err.into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "walk error")),
            )
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".jsonl") {
            continue;
        }
        if name.ends_with(".lock") || name.contains(".deleted.") {
            continue;
        }

        let metadata = entry.metadata().map_err(|err| {
            Error::CannotReadRoot(
                path.to_path_buf(),
                err.into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "metadata error")),
            )
        })?;
        let modified_ms = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(SystemTime::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        files.push(DiscoveredFile {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified_ms,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_lock_and_deleted_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jsonl"), "{}").unwrap();
        fs::write(dir.path().join("a.jsonl.lock"), "").unwrap();
        fs::write(dir.path().join("b.deleted.jsonl"), "{}").unwrap();

        let files = enumerate_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path.file_name().unwrap(), "a.jsonl");
    }

    #[test]
    fn missing_root_yields_empty_list() {
        let files = enumerate_files(Path::new("/nonexistent/path/for/sure")).unwrap();
        assert!(files.is_empty());
    }
}
