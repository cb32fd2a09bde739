//! Session loop driver
//!
//! Runs the fetch → broadcast → wait cycle for one connection until the peer
//! disconnects or the cycle fails. The close signal is checked at every
//! suspension point, so a disconnect observed mid-fetch or mid-wait tears the
//! session down promptly.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

use crate::registry::ClientRegistry;
use crate::telemetry::{FetchError, Fetcher};

use super::state::SessionState;
use super::Disconnect;

/// How a session loop ended
///
/// Same terminal state either way, but teardown logging distinguishes a clean
/// disconnect from a failure.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer closed the connection
    PeerClosed,
    /// The transport failed mid-read
    TransportFailed(String),
    /// The upstream fetch failed; fatal to this loop only
    FetchFailed(FetchError),
    /// This connection's own handle was evicted during the fan-out
    Evicted,
    /// Unclassified loop-body error, treated like a fetch failure
    Internal(String),
}

impl std::fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEnd::PeerClosed => write!(f, "peer closed"),
            SessionEnd::TransportFailed(reason) => write!(f, "transport failed: {}", reason),
            SessionEnd::FetchFailed(e) => write!(f, "fetch failed: {}", e),
            SessionEnd::Evicted => write!(f, "evicted after failed send"),
            SessionEnd::Internal(reason) => write!(f, "internal error: {}", reason),
        }
    }
}

/// Drive one connection's session loop to completion
///
/// Each cycle fetches a fresh snapshot and broadcasts it to every registered
/// client, not just this one; concurrent loops do the same independently, and
/// the redundant fetches are accepted. On any exit path the handle is
/// deregistered (idempotently, since broadcast eviction may have won the
/// race) before the end tag is returned.
pub async fn run_session<F>(
    state: &mut SessionState,
    registry: &ClientRegistry,
    fetcher: &F,
    session_key: &str,
    poll_interval: Duration,
    mut closed: oneshot::Receiver<Disconnect>,
) -> SessionEnd
where
    F: Fetcher + ?Sized,
{
    let end = loop {
        state.begin_fetch();
        let snapshot = tokio::select! {
            signal = &mut closed => break end_from_signal(signal),
            result = fetcher.fetch_snapshot(session_key) => match result {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(client = %state.id, error = %e, "Fetch failed, ending session");
                    break SessionEnd::FetchFailed(e);
                }
            }
        };

        let payload = match snapshot.to_wire() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(client = %state.id, error = %e, "Snapshot encoding failed");
                break SessionEnd::Internal(e.to_string());
            }
        };

        state.begin_broadcast();
        let delivered = registry.broadcast(Message::text(payload)).await;

        // Our own writer died if broadcast just evicted us
        if !registry.contains(state.id).await {
            break SessionEnd::Evicted;
        }

        state.begin_wait(delivered);
        tracing::trace!(
            client = %state.id,
            cycle = state.cycles,
            delivered = delivered,
            "Cycle complete"
        );

        tokio::select! {
            signal = &mut closed => break end_from_signal(signal),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    };

    state.teardown();
    registry.deregister(state.id).await;
    end
}

fn end_from_signal(signal: Result<Disconnect, oneshot::error::RecvError>) -> SessionEnd {
    match signal {
        Ok(Disconnect::Peer) => SessionEnd::PeerClosed,
        Ok(Disconnect::Transport(reason)) => SessionEnd::TransportFailed(reason),
        // Sender dropped without a reason: the reader task is gone, treat as
        // a peer disconnect
        Err(_) => SessionEnd::PeerClosed,
    }
}
