//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures that prevented a request/response round trip from completing.
///
/// A non-2xx status is not a transport error; it arrives as an ordinary
/// [`HttpResponse`](crate::HttpResponse).
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP protocol error (malformed request, body read failure)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Connection could not be established or was reset
    #[error("Connection error: {0}")]
    Connection(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport's own deadline elapsed
    #[error("Timeout")]
    Timeout,

    /// Generic transport error
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Whether this failure is a deadline expiry rather than a broken connection.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
