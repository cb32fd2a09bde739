//! Upstream telemetry fetching
//!
//! The [`Fetcher`] trait is the seam between the session loop and the
//! upstream API; [`OpenF1Fetcher`] is the production implementation composing
//! the `sessions` and `drivers` endpoints over HTTP.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::error::FetchError;
use super::types::{DriverInfo, SessionInfo, Snapshot};

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";

/// Source of telemetry snapshots
///
/// Implemented by [`OpenF1Fetcher`] in production and by in-memory stubs in
/// tests. One snapshot is fetched per session-loop cycle.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a fresh snapshot for the given session key
    ///
    /// `"latest"` selects the most recent session upstream.
    async fn fetch_snapshot(&self, session_key: &str) -> Result<Snapshot, FetchError>;
}

/// Fetcher against an OpenF1-shaped REST API
///
/// Issues `GET {base}/sessions?session_key={key}` and
/// `GET {base}/drivers?session_key={key}` concurrently. Both must answer 2xx
/// with a JSON array; the first element of the sessions array is taken as
/// authoritative, and an empty sessions array is [`FetchError::NoSession`].
pub struct OpenF1Fetcher {
    http: reqwest::Client,
    base_url: String,
}

impl OpenF1Fetcher {
    /// Create a fetcher with a default HTTP client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a fetcher with a caller-supplied HTTP client
    ///
    /// Useful for custom timeouts or proxy settings.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_array<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        session_key: &str,
    ) -> Result<Vec<T>, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .http
            .get(&url)
            .query(&[("session_key", session_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus { endpoint, status });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Fetcher for OpenF1Fetcher {
    async fn fetch_snapshot(&self, session_key: &str) -> Result<Snapshot, FetchError> {
        let (sessions, drivers) = tokio::try_join!(
            self.fetch_array::<SessionInfo>("sessions", session_key),
            self.fetch_array::<DriverInfo>("drivers", session_key),
        )?;

        let session = sessions.into_iter().next().ok_or(FetchError::NoSession)?;

        tracing::debug!(
            session_name = %session.session_name,
            drivers = drivers.len(),
            "Snapshot fetched"
        );

        Ok(Snapshot::new(drivers, session))
    }
}
