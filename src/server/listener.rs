//! Relay server listener
//!
//! Handles the TCP accept loop and spawns one connection handler per client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::registry::ClientRegistry;
use crate::stats::ServerStats;
use crate::telemetry::Fetcher;

use super::config::RelayConfig;
use super::connection::Connection;

/// Telemetry relay server
pub struct RelayServer<F> {
    config: RelayConfig,
    fetcher: Arc<F>,
    registry: Arc<ClientRegistry>,
    next_session_id: AtomicU64,
    total_connections: AtomicU64,
    connection_semaphore: Option<Arc<Semaphore>>,
    started_at: Instant,
}

impl<F: Fetcher + 'static> RelayServer<F> {
    /// Create a new server with the given configuration and fetcher
    pub fn new(config: RelayConfig, fetcher: F) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config,
            fetcher: Arc::new(fetcher),
            registry: Arc::new(ClientRegistry::new()),
            next_session_id: AtomicU64::new(1),
            total_connections: AtomicU64::new(0),
            connection_semaphore,
            started_at: Instant::now(),
        }
    }

    /// Get a reference to the client registry
    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> std::net::SocketAddr {
        self.config.bind_addr
    }

    /// Get server-wide statistics
    pub async fn stats(&self) -> ServerStats {
        ServerStats {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.registry.len().await as u64,
            broadcasts_sent: self.registry.broadcasts(),
            clients_evicted: self.registry.evictions(),
            uptime: self.started_at.elapsed(),
        }
    }

    /// Run the server
    ///
    /// This method blocks until the server is shut down.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        self.accept_loop(&listener).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<S>(&self, shutdown: S) -> Result<()>
    where
        S: std::future::Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "Relay server listening");

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    async fn handle_connection(&self, socket: TcpStream, peer_addr: std::net::SocketAddr) {
        // Check connection limit; the permit rides along with the task
        let permit = if let Some(ref sem) = self.connection_semaphore {
            match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            }
        } else {
            None
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            session_id = session_id,
            peer = %peer_addr,
            "New connection"
        );

        if let Err(e) = self.configure_socket(&socket) {
            tracing::error!(error = %e, "Failed to configure socket");
            return;
        }

        let config = self.config.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            let _permit = permit;
            let connection =
                Connection::new(session_id, socket, peer_addr, config, fetcher, registry);

            if let Err(e) = connection.run().await {
                tracing::debug!(
                    session_id = session_id,
                    error = %e,
                    "Connection error"
                );
            }

            tracing::debug!(session_id = session_id, "Connection closed");
        });
    }

    fn configure_socket(&self, socket: &TcpStream) -> std::io::Result<()> {
        if self.config.tcp_nodelay {
            socket.set_nodelay(true)?;
        }

        Ok(())
    }
}
