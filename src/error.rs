//! Unified error type.

use thiserror::Error as ThisError;

/// The error type returned by laika's fallible operations.
///
/// A missing route is not an `Error` — the dispatch pipeline answers it
/// with a 404 response. This type surfaces infrastructure failures
/// (binding a port, accepting a connection), response-serialization
/// failures, and failures reported by route handlers.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Transport-level I/O failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A response body could not be serialized to JSON.
    #[error("serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A route handler reported a failure.
    #[error("handler: {0}")]
    Handler(String),
}

impl Error {
    /// Shorthand for a handler-reported failure.
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}
