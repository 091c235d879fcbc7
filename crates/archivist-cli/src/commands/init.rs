use std::path::Path;

use crate::Result;

/// `archivist init` (ambient stack, modeled on the teacher's "run once to
/// get started" workflow): resolves/creates the state directory, opens (and
/// so initializes) the store, then runs an `all`-mode scan. `--refresh`
/// forces a full re-scan instead of respecting any existing watermark.
pub fn run(dir: Option<&Path>, refresh: bool, json: bool) -> Result<()> {
    let (state_dir, store) = super::open_store(dir)?;
    if !json {
        println!("archivist initialized at {}", state_dir.display());
    }
    super::scan(&store, &state_dir, "all", refresh, None, false, json)
}
