use std::fmt;

/// Result type for archivist-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or validating domain records
#[derive(Debug)]
pub enum Error {
    /// A timestamp string did not parse as ISO-8601
    InvalidTimestamp(String),
    /// A required field was missing from a record
    MissingField(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTimestamp(ts) => write!(f, "invalid timestamp: {}", ts),
            Error::MissingField(name) => write!(f, "missing required field: {}", name),
        }
    }
}

impl std::error::Error for Error {}
