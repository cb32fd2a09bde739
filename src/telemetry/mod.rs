//! Upstream telemetry types and fetching
//!
//! The relay consumes an OpenF1-shaped REST API: a `sessions` endpoint
//! describing the current session and a `drivers` endpoint listing the field.
//! One [`Snapshot`] is assembled per poll cycle and broadcast to all clients.

pub mod error;
pub mod fetcher;
pub mod types;

pub use error::FetchError;
pub use fetcher::{Fetcher, OpenF1Fetcher};
pub use types::{DriverInfo, SessionInfo, Snapshot};
