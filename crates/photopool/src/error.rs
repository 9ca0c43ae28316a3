//! Error types for photopool

use std::fmt;
use std::io;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for pool operations
#[derive(Debug)]
pub enum Error {
    /// A dataset line failed to parse (fatal configuration error)
    Dataset {
        /// 1-based line number in the source file
        line: usize,
        /// Parser failure description
        reason: String,
    },

    /// The dataset source could not be read
    Io(io::Error),

    /// A stored record could not be decoded
    Record(String),

    /// A store call failed
    Store(photostore::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Dataset { line, reason } => {
                write!(f, "malformed dataset line {}: {}", line, reason)
            }
            Error::Io(e) => write!(f, "dataset I/O error: {}", e),
            Error::Record(msg) => write!(f, "corrupt stored record: {}", msg),
            Error::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<photostore::Error> for Error {
    fn from(err: photostore::Error) -> Self {
        Error::Store(err)
    }
}
