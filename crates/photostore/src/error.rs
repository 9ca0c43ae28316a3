//! Error types for photostore

use std::fmt;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for store operations
#[derive(Debug)]
pub enum Error {
    /// The store could not be reached or answered with a failure
    Unavailable(String),

    /// A store call exceeded its deadline
    Timeout,

    /// The key already holds a value of a different collection kind
    WrongType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            Error::Timeout => write!(f, "store call timed out"),
            Error::WrongType(key) => write!(f, "wrong value type at key '{}'", key),
        }
    }
}

impl std::error::Error for Error {}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Unavailable(err.to_string())
        }
    }
}
