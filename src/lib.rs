//! Real-time motorsport telemetry relay
//!
//! `pitwall-rs` polls an upstream timing API for session and driver snapshots
//! and fans the latest snapshot out to every connected WebSocket client.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ClientRegistry>
//!                   ┌──────────────────────────┐
//!                   │ clients: HashMap<        │
//!                   │   ClientId,              │
//!                   │   ClientHandle { tx }    │
//!                   │ >                        │
//!                   └────────────┬─────────────┘
//!                                │ broadcast()
//!        ┌───────────────────────┼───────────────────────┐
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//!   [writer task]           [writer task]           [writer task]
//!   rx.recv()               rx.recv()               rx.recv()
//!        │                       │                       │
//!        └──► WebSocket          └──► WebSocket          └──► WebSocket
//! ```
//!
//! Each accepted connection runs its own session loop (fetch upstream →
//! broadcast → wait), so loops are independent: a failed fetch or a dead
//! socket tears down one connection without touching the others.
//!
//! # Example
//! ```no_run
//! use pitwall_rs::server::{RelayConfig, RelayServer};
//! use pitwall_rs::telemetry::OpenF1Fetcher;
//!
//! # async fn example() -> pitwall_rs::error::Result<()> {
//! let config = RelayConfig::default();
//! let fetcher = OpenF1Fetcher::new(config.upstream_base_url.clone());
//! let server = RelayServer::new(config, fetcher);
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;
pub mod telemetry;

pub use error::{Error, Result};
pub use registry::{ClientHandle, ClientId, ClientRegistry};
pub use server::{RelayConfig, RelayServer};
pub use session::{Disconnect, SessionEnd, SessionPhase, SessionState};
pub use telemetry::{DriverInfo, FetchError, Fetcher, OpenF1Fetcher, SessionInfo, Snapshot};
