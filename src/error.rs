//! Crate-level error types
//!
//! Errors surfaced by the listener and connection setup. Failures inside a
//! running session loop are classified by [`crate::session::SessionEnd`]
//! instead, since they end one connection rather than an operation.

use crate::telemetry::FetchError;

/// Convenience result type for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket-level I/O failure (bind, accept, socket options)
    Io(std::io::Error),
    /// WebSocket handshake failed or timed out
    Handshake(tokio_tungstenite::tungstenite::Error),
    /// Upstream telemetry fetch failed
    Fetch(FetchError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Handshake(e) => write!(f, "WebSocket handshake failed: {}", e),
            Error::Fetch(e) => write!(f, "Telemetry fetch failed: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Handshake(e) => Some(e),
            Error::Fetch(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Handshake(e)
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Error::Fetch(e)
    }
}
