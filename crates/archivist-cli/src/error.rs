use std::fmt;

/// Result type for the archivist CLI.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors the CLI can surface. Per spec §7, only conditions that prevent
/// *any* progress are fatal — per-file scan errors are folded into
/// `ScanReport` counters instead and never reach this type.
#[derive(Debug)]
pub enum Error {
    Scanner(archivist_scanner::Error),
    Store(archivist_store::Error),
    Query(archivist_query::Error),
    Importer(archivist_importers::Error),
    Io(std::io::Error),
    /// A CLI argument was well-formed for clap but invalid for the
    /// operation (unknown mode string, unknown export format, ...).
    Usage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Scanner(err) => write!(f, "{}", err),
            Error::Store(err) => write!(f, "{}", err),
            Error::Query(err) => write!(f, "{}", err),
            Error::Importer(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
            Error::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scanner(err) => Some(err),
            Error::Store(err) => Some(err),
            Error::Query(err) => Some(err),
            Error::Importer(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Usage(_) => None,
        }
    }
}

impl From<archivist_scanner::Error> for Error {
    fn from(err: archivist_scanner::Error) -> Self {
        Error::Scanner(err)
    }
}

impl From<archivist_store::Error> for Error {
    fn from(err: archivist_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<archivist_query::Error> for Error {
    fn from(err: archivist_query::Error) -> Self {
        Error::Query(err)
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
