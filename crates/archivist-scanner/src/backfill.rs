use std::path::Path;

use archivist_importers::ImportSummary;
use archivist_store::Store;

use crate::error::Error;
use crate::Result;

/// Third-party export formats the Scanner can backfill from (spec §4.4).
/// Internal event-log re-ingest is not listed here: it goes through `scan`
/// itself with `force: true`, not through this importer bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    Telegram,
    WhatsApp,
    Discord,
}

impl ImportSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Telegram => "telegram",
            ImportSource::WhatsApp => "whatsapp",
            ImportSource::Discord => "discord",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "telegram" => ImportSource::Telegram,
            "whatsapp" => ImportSource::WhatsApp,
            "discord" => ImportSource::Discord,
            _ => return None,
        })
    }
}

/// Parses `path` as `source`'s export format and writes the resulting
/// Messages through the Store's ordinary duplicate-checked batch insert
/// (spec §4.4 — the same three-stage predicate governs backfill as live
/// ingest).
pub fn run_import(store: &Store, source: ImportSource, path: &Path) -> Result<ImportSummary> {
    if !path.exists() {
        return Err(Error::CannotReadRoot(
            path.to_path_buf(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "import file not found"),
        ));
    }

    let messages = match source {
        ImportSource::Telegram => archivist_importers::parse_telegram_export(path)?,
        ImportSource::WhatsApp => archivist_importers::parse_whatsapp_export(path)?,
        ImportSource::Discord => archivist_importers::parse_discord_export(path)?,
    };

    let summary = archivist_importers::import_messages(store, source.as_str(), path, &messages)?;
    Ok(summary)
}
