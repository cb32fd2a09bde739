//! Server-wide statistics

use std::time::Duration;

/// Server-wide statistics
///
/// Assembled on demand by `RelayServer::stats` from the listener's counters
/// and the registry's broadcast/eviction counters.
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    /// Total connections ever accepted
    pub total_connections: u64,
    /// Currently registered clients
    pub active_connections: u64,
    /// Broadcast passes completed across all session loops
    pub broadcasts_sent: u64,
    /// Clients evicted after a failed send
    pub clients_evicted: u64,
    /// Time since the server was created
    pub uptime: Duration,
}

impl ServerStats {
    /// Create an empty stats snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections that have come and gone
    pub fn closed_connections(&self) -> u64 {
        self.total_connections.saturating_sub(self.active_connections)
    }
}
