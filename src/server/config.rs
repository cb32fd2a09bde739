//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::telemetry::fetcher::DEFAULT_BASE_URL;

/// Relay server configuration options
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Base URL of the upstream telemetry API
    pub upstream_base_url: String,

    /// Session key passed to the upstream endpoints ("latest" follows the
    /// most recent session)
    pub session_key: String,

    /// Fixed delay between fetch→broadcast cycles; bounds the upstream call
    /// rate per connection loop
    pub poll_interval: Duration,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// WebSocket handshake must complete within this time
    pub handshake_timeout: Duration,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            upstream_base_url: DEFAULT_BASE_URL.to_string(),
            session_key: "latest".to_string(),
            poll_interval: Duration::from_secs(3),
            max_connections: 0, // Unlimited
            handshake_timeout: Duration::from_secs(10),
            tcp_nodelay: true, // Important for low latency
        }
    }
}

impl RelayConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the upstream base URL
    pub fn upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = url.into();
        self
    }

    /// Set the session key
    pub fn session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// Set the poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the handshake timeout
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.upstream_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.session_key, "latest");
        assert_eq!(config.poll_interval, Duration::from_secs(3));
        assert_eq!(config.max_connections, 0);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9001".parse().unwrap();
        let config = RelayConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9001);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        let config = RelayConfig::default()
            .bind(addr)
            .upstream_base_url("http://localhost:4000/v1")
            .session_key("9222")
            .poll_interval(Duration::from_secs(1))
            .max_connections(50)
            .handshake_timeout(Duration::from_secs(5));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.upstream_base_url, "http://localhost:4000/v1");
        assert_eq!(config.session_key, "9222");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
    }
}
