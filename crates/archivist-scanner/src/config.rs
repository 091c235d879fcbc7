use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// TOML-backed configuration for the scanner/store pair. Resolution order
/// for the state directory (spec §4.1/§6, ambient stack): an explicit path
/// argument, then `ARCHIVIST_PATH`, then the platform data directory via
/// `dirs`, then `~/.archivist` as a last resort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_file: default_db_file(),
        }
    }
}

fn default_db_file() -> String {
    "archive.db".to_string()
}

/// Loads `<state_dir>/config.toml` if present, otherwise returns defaults
/// (spec SPEC_FULL.md ambient stack: "default-on-missing-file").
pub fn load_config(state_dir: &Path) -> Result<Config> {
    let path = state_dir.join("config.toml");
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(&path)?;
    toml::from_str(&text).map_err(|e| Error::Config(format!("invalid config at {}: {}", path.display(), e)))
}

/// Resolves the state directory following the fallback chain described
/// above. `explicit` takes precedence over everything, including tilde
/// expansion.
pub fn resolve_state_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand_tilde(path));
    }
    if let Ok(env_path) = std::env::var("ARCHIVIST_PATH") {
        if !env_path.is_empty() {
            return Ok(expand_tilde(Path::new(&env_path)));
        }
    }
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("archivist"));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".archivist"));
    }
    Err(Error::Config(
        "could not determine a state directory: no explicit path, ARCHIVIST_PATH, or home directory"
            .to_string(),
    ))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    if let Some(rest) = s.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if s == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

/// Default store file path for a state directory (spec §4.1: `<state-dir>/archive/<db-file>`).
pub fn default_store_path(state_dir: &Path, config: &Config) -> PathBuf {
    state_dir.join("archive").join(&config.db_file)
}

/// Default scan roots under a state directory (spec §6): `agents/*/sessions`,
/// `agents/*/subagent/sessions`, and `cron/runs`. Callers enumerate `agents/*`
/// themselves since the agent name is a wildcard segment, not fixed config.
pub fn default_agents_root(state_dir: &Path) -> PathBuf {
    state_dir.join("agents")
}

pub fn default_cron_root(state_dir: &Path) -> PathBuf {
    state_dir.join("cron").join("runs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_everything() {
        let resolved = resolve_state_dir(Some(Path::new("/tmp/explicit-state"))).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/explicit-state"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.db_file, "archive.db");
    }
}
