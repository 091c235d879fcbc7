use std::fmt;
use std::path::PathBuf;

/// Result type for archivist-scanner operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while configuring or running a scan. Per spec
/// §7, only conditions that prevent *any* progress are fatal here — per-file
/// parse/IO errors are folded into the scan's counters instead (see
/// `ScanReport`).
#[derive(Debug)]
pub enum Error {
    /// The state directory could not be resolved or created.
    Config(String),
    /// The scan root does not exist or could not be enumerated at all.
    CannotReadRoot(PathBuf, std::io::Error),
    Store(archivist_store::Error),
    Importer(archivist_importers::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {}", msg),
            Error::CannotReadRoot(path, err) => {
                write!(f, "cannot read scan root {}: {}", path.display(), err)
            }
            Error::Store(err) => write!(f, "store error: {}", err),
            Error::Importer(err) => write!(f, "importer error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(_) => None,
            Error::CannotReadRoot(_, err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Importer(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<archivist_store::Error> for Error {
    fn from(err: archivist_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<archivist_importers::Error> for Error {
    fn from(err: archivist_importers::Error) -> Self {
        Error::Importer(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
