//! Relay server: accept loop and per-connection plumbing
//!
//! [`RelayServer`] binds a TCP listener, upgrades inbound connections to
//! WebSocket, and spawns one [`Connection`] task per client. Each connection
//! splits the socket into a writer task (draining the registry channel into
//! the sink) and a reader task (watching for the peer close), with the
//! session loop in between.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::RelayConfig;
pub use connection::Connection;
pub use listener::RelayServer;
