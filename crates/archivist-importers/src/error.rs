use std::fmt;

/// Result type for archivist-importers operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while importing a third-party chat export.
/// Per spec §7: an unknown record inside an otherwise-valid export is
/// skipped, not an error here; only a structurally invalid top-level export
/// (not the expected JSON/text shape at all) is fatal.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Store(archivist_store::Error),
    /// The file's top-level structure doesn't match the expected export
    /// format at all (spec §7 "invalid top-level structure").
    InvalidTopLevel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
            Error::Store(err) => write!(f, "store error: {}", err),
            Error::InvalidTopLevel(msg) => write!(f, "invalid export structure: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::InvalidTopLevel(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<archivist_store::Error> for Error {
    fn from(err: archivist_store::Error) -> Self {
        Error::Store(err)
    }
}
