use std::fmt;
use std::path::PathBuf;

/// Result type for archivist-parser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while streaming an event-log file. A malformed
/// line or an unrecognized `type` is never surfaced this way (spec §4.3: the
/// parser skips and continues) — only the few conditions that prevent any
/// progress at all are errors here.
#[derive(Debug)]
pub enum Error {
    /// The event-log file could not be opened at all.
    MissingFile(PathBuf, std::io::Error),
    /// A lower-level IO failure while reading an already-open file.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingFile(path, err) => {
                write!(f, "cannot open event-log file {}: {}", path.display(), err)
            }
            Error::Io(err) => write!(f, "IO error reading event-log: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingFile(_, err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
