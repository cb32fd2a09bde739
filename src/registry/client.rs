//! Client handle types
//!
//! A [`ClientHandle`] is the registry's view of one live connection: an
//! opaque id plus the sender half of the channel drained by that connection's
//! writer task. Handles are cheap to clone; tasks hold a clone or just the
//! id, never a reference into the live connection set.

use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Opaque, comparable identifier for one open connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Send to a specific client failed
///
/// The writer task for that connection has died; the client is in the process
/// of disconnecting. Recovered by eviction during broadcast, never propagated
/// to the broadcast caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError(pub ClientId);

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "send to {} failed: connection closed", self.0)
    }
}

impl std::error::Error for SendError {}

/// Handle to one live client connection
///
/// Owned by the registry once registered. Messages pushed here are delivered
/// in push order by the connection's writer task.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    id: ClientId,
    tx: mpsc::UnboundedSender<Message>,
}

impl ClientHandle {
    /// Create a handle from an id and the writer task's sender
    pub fn new(id: ClientId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { id, tx }
    }

    /// Get the client id
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Queue a message for this client
    ///
    /// Never blocks. Fails only when the writer task has ended, which is how
    /// a dead connection is discovered lazily.
    pub fn send(&self, message: Message) -> Result<(), SendError> {
        self.tx.send(message).map_err(|_| SendError(self.id))
    }

    /// Whether the writer task has ended
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
