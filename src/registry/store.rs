//! Client registry implementation
//!
//! The central registry that tracks live client connections and routes
//! snapshot payloads to them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message;

use super::client::{ClientHandle, ClientId};

/// Central registry for all connected clients
///
/// Thread-safe via `RwLock`. The lock is held only for membership reads and
/// add/remove; broadcast copies the membership out and sends lock-free, so
/// concurrent register/deregister calls never wait on in-flight sends.
pub struct ClientRegistry {
    /// Map of client id to handle
    clients: RwLock<HashMap<ClientId, ClientHandle>>,

    /// Broadcast passes completed
    broadcasts: AtomicU64,

    /// Handles evicted after a failed send
    evictions: AtomicU64,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
            broadcasts: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Register a freshly accepted client
    ///
    /// The handle becomes a broadcast target immediately. Registering an id
    /// twice is a caller bug; the stale entry is replaced with a warning.
    pub async fn register(&self, handle: ClientHandle) {
        let id = handle.id();
        let previous = self.clients.write().await.insert(id, handle);

        if previous.is_some() {
            tracing::warn!(client = %id, "Duplicate registration replaced stale handle");
        } else {
            tracing::debug!(client = %id, "Client registered");
        }
    }

    /// Remove a client if present
    ///
    /// Idempotent: removing an absent id is a no-op, so explicit disconnect
    /// handling and broadcast-failure eviction can race without harm.
    /// Returns whether an entry was actually removed.
    pub async fn deregister(&self, id: ClientId) -> bool {
        let removed = self.clients.write().await.remove(&id).is_some();

        if removed {
            tracing::debug!(client = %id, "Client deregistered");
        }

        removed
    }

    /// Send a message to exactly one client
    ///
    /// A send failure is swallowed: the client is assumed to be mid-disconnect
    /// and its own teardown path will deregister it. Evicting here would race
    /// with `broadcast` eviction.
    pub async fn unicast(&self, id: ClientId, message: Message) {
        let handle = self.clients.read().await.get(&id).cloned();

        if let Some(handle) = handle {
            if handle.send(message).is_err() {
                tracing::debug!(client = %id, "Unicast to closing client dropped");
            }
        }
    }

    /// Send a message to every registered client
    ///
    /// Operates over a snapshot of the membership taken at call time. A send
    /// failure marks that handle for eviction but never aborts the remaining
    /// sends; every marked handle is deregistered exactly once after the
    /// pass. Returns the number of clients the message was delivered to.
    pub async fn broadcast(&self, message: Message) -> usize {
        let targets: Vec<ClientHandle> = {
            let clients = self.clients.read().await;
            clients.values().cloned().collect()
        };

        let mut delivered = 0;
        let mut failed: Vec<ClientId> = Vec::new();

        for handle in &targets {
            match handle.send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => failed.push(handle.id()),
            }
        }

        for id in failed {
            if self.deregister(id).await {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::info!(client = %id, "Client evicted after failed send");
            }
        }

        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        delivered
    }

    /// Number of currently registered clients
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Whether no clients are registered
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// Whether the given client is registered
    pub async fn contains(&self, id: ClientId) -> bool {
        self.clients.read().await.contains_key(&id)
    }

    /// Total broadcast passes completed
    pub fn broadcasts(&self) -> u64 {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Total handles evicted after failed sends
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
