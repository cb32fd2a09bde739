//! Per-connection session loop
//!
//! Each accepted connection runs one session: register the handle, then cycle
//! fetch-upstream → broadcast-to-all → wait until the peer disconnects or the
//! cycle hits an unrecoverable error. Loops are fully independent; a failure
//! in one never touches another connection's loop or the registry's
//! integrity.

pub mod runner;
pub mod state;

pub use runner::{run_session, SessionEnd};
pub use state::{SessionPhase, SessionState};

/// Close signal from the transport boundary
///
/// Disconnect is data, not control flow: the reader task classifies how the
/// connection ended and the runner picks the matching teardown path.
#[derive(Debug)]
pub enum Disconnect {
    /// The peer closed the connection cleanly
    Peer,
    /// The transport failed mid-read
    Transport(String),
}
