//! Fetch error types

use reqwest::StatusCode;

/// Error type for upstream telemetry fetches
///
/// A fetch error is fatal to the session loop that triggered it, and to that
/// loop only; other connections keep their own cycles running.
#[derive(Debug)]
pub enum FetchError {
    /// Request-level failure: connect, timeout, or malformed body
    Request(reqwest::Error),
    /// Upstream answered with a non-2xx status
    UpstreamStatus {
        /// Which endpoint failed ("sessions" or "drivers")
        endpoint: &'static str,
        /// The status code returned
        status: StatusCode,
    },
    /// The sessions endpoint returned an empty array
    NoSession,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Request(e) => write!(f, "upstream request failed: {}", e),
            FetchError::UpstreamStatus { endpoint, status } => {
                write!(f, "upstream {} endpoint returned {}", endpoint, status)
            }
            FetchError::NoSession => write!(f, "no session data"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e)
    }
}
