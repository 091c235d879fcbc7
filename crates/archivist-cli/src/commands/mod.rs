mod doctor;
mod import;
mod init;
mod list;
mod maintenance;
mod scan;
mod search;
mod session;

pub use doctor::run as doctor;
pub use import::run as import;
pub use init::run as init;
pub use list::run_messages as list_messages;
pub use list::run_sessions as list_sessions;
pub use maintenance::refresh_counts;
pub use maintenance::vacuum;
pub use scan::run as scan;
pub use search::run as search;
pub use session::run_export as session_export;
pub use session::run_show as session_show;

use std::path::{Path, PathBuf};

use archivist_scanner::{default_store_path, load_config, resolve_state_dir};
use archivist_store::Store;

use crate::Result;

/// Resolves the state directory and opens the store at its default path
/// within it, creating the schema on first run (spec §4.1: "on open ...
/// creates any missing tables").
pub fn open_store(explicit_dir: Option<&Path>) -> Result<(PathBuf, Store)> {
    let state_dir = resolve_state_dir(explicit_dir)?;
    let config = load_config(&state_dir)?;
    let db_path = default_store_path(&state_dir, &config);
    let store = Store::open(&db_path)?;
    Ok((state_dir, store))
}

/// `archivist checkpoint <key> [value]`: direct ScannerState read/write,
/// mostly useful for scripting around a scan (e.g. rewinding a watermark).
pub fn checkpoint(store: &Store, key: &str, value: Option<&str>, json: bool) -> Result<()> {
    let previous = store.checkpoint(key, value)?;
    if json {
        crate::output::print_json(&serde_json::json!({
            "key": key,
            "previous": previous,
            "written": value,
        }));
        return Ok(());
    }
    match value {
        Some(v) => println!("{key} = {v} (was {})", previous.as_deref().unwrap_or("-")),
        None => println!("{key} = {}", previous.as_deref().unwrap_or("-")),
    }
    Ok(())
}
