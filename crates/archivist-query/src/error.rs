use std::fmt;

/// Result type for archivist-query operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Store(archivist_store::Error),
    /// `session_detail`/`export_session` on a session id with no matching row.
    SessionNotFound(String),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "store error: {}", err),
            Error::SessionNotFound(id) => write!(f, "no such session: {}", id),
            Error::Csv(err) => write!(f, "csv error: {}", err),
            Error::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::SessionNotFound(_) => None,
            Error::Csv(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

impl From<archivist_store::Error> for Error {
    fn from(err: archivist_store::Error) -> Self {
        Error::Store(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
