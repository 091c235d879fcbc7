use std::path::Path;

use archivist_types::SessionType;

/// Derives the session id (file basename, no extension) and the colon-joined
/// session key from a `.jsonl` path relative to the scan root (spec §4.5,
/// §9 Open Question — "source has a partial heuristic with a TODO").
///
/// Resolved here as: `agents/<agent>/sessions/<id>.jsonl` → `agent:<agent>:main`;
/// `agents/<agent>/subagent/sessions/<id>.jsonl` → `agent:<agent>:main:subagent`;
/// `agents/<agent>/isolated/sessions/<id>.jsonl` → `agent:<agent>:main:isolated`;
/// `cron/runs/<id>.jsonl` → `cron:runs`. Any other layout falls back to the
/// path's parent-directory components joined with `:`, which keeps the
/// derivation total (every enumerable file gets a key) without guessing at
/// shapes the spec never describes.
pub fn derive_session_key(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let components: Vec<&str> = relative
        .parent()
        .map(|p| p.iter().filter_map(|c| c.to_str()).collect())
        .unwrap_or_default();

    // Cron roots may be passed at any of three granularities (the state
    // dir itself, `<state>/cron`, or `<state>/cron/runs`), so a `cron`
    // segment can show up in `root` instead of in `components`.
    let root_has_cron = root.iter().any(|c| c.to_str() == Some("cron"));

    match components.as_slice() {
        [agent, "sessions"] => format!("agent:{}:main", agent),
        [agent, "subagent", "sessions"] => format!("agent:{}:main:subagent", agent),
        [agent, "isolated", "sessions"] => format!("agent:{}:main:isolated", agent),
        _ if components.first() == Some(&"cron") || root_has_cron => "cron:runs".to_string(),
        [] => "unknown".to_string(),
        other => other.join(":"),
    }
}

pub fn session_id_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

/// Infers `SessionType` from the derived session key (spec §3 Session).
pub fn session_type_from_key(session_key: &str) -> SessionType {
    if session_key.starts_with("cron:") {
        SessionType::Cron
    } else if session_key.ends_with(":subagent") {
        SessionType::Subagent
    } else if session_key.ends_with(":isolated") {
        SessionType::Isolated
    } else {
        SessionType::Main
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_agent_session_key() {
        let root = Path::new("/state/agents");
        let path = Path::new("/state/agents/main/sessions/AAA.jsonl");
        assert_eq!(derive_session_key(path, root), "agent:main:main");
        assert_eq!(session_id_from_path(path), "AAA");
        assert_eq!(session_type_from_key("agent:main:main"), SessionType::Main);
    }

    #[test]
    fn subagent_session_key_adds_suffix() {
        let root = Path::new("/state/agents");
        let path = Path::new("/state/agents/main/subagent/sessions/BBB.jsonl");
        assert_eq!(derive_session_key(path, root), "agent:main:main:subagent");
        assert_eq!(session_type_from_key("agent:main:main:subagent"), SessionType::Subagent);
    }

    #[test]
    fn cron_session_key() {
        let root = Path::new("/state/cron/runs");
        let path = Path::new("/state/cron/runs/CCC.jsonl");
        assert_eq!(derive_session_key(path, root), "cron:runs");
        assert_eq!(session_type_from_key("cron:runs"), SessionType::Cron);
    }
}
