//! Session state machine
//!
//! Tracks one connection's lifecycle from registration to teardown.

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::ClientId;

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Handle registered, cycle not yet started
    Registered,
    /// Awaiting the upstream fetch
    Fetching,
    /// Fanning the snapshot out to all clients
    Broadcasting,
    /// Fixed inter-cycle delay
    Waiting,
    /// Loop ended; handle deregistered and resources released
    Teardown,
}

/// State for one connection's session loop
#[derive(Debug)]
pub struct SessionState {
    /// Client id for this connection
    pub id: ClientId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// When the session was registered
    pub registered_at: Instant,

    /// Completed fetch→broadcast cycles
    pub cycles: u64,

    /// Total clients reached by this loop's broadcasts
    pub deliveries: u64,
}

impl SessionState {
    /// Create state for a freshly registered connection
    pub fn new(id: ClientId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::Registered,
            registered_at: Instant::now(),
            cycles: 0,
            deliveries: 0,
        }
    }

    /// Enter the fetching phase
    pub fn begin_fetch(&mut self) {
        self.phase = SessionPhase::Fetching;
    }

    /// Enter the broadcasting phase
    pub fn begin_broadcast(&mut self) {
        self.phase = SessionPhase::Broadcasting;
    }

    /// Enter the waiting phase, recording a completed cycle
    pub fn begin_wait(&mut self, delivered: usize) {
        self.phase = SessionPhase::Waiting;
        self.cycles += 1;
        self.deliveries += delivered as u64;
    }

    /// Enter the terminal teardown phase
    pub fn teardown(&mut self) {
        self.phase = SessionPhase::Teardown;
    }

    /// Whether the session has ended
    pub fn is_terminal(&self) -> bool {
        self.phase == SessionPhase::Teardown
    }

    /// How long the session has been alive
    pub fn duration(&self) -> std::time::Duration {
        self.registered_at.elapsed()
    }
}
