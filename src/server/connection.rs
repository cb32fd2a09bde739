//! Per-connection handler
//!
//! Upgrades the accepted socket to WebSocket, registers the client, and runs
//! its session loop. The socket is split into a writer task (owns the sink,
//! drains the handle's channel) and a reader task (classifies how the
//! connection ends); the session loop selects on the reader's close signal at
//! every suspension point.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::error::{Error, Result};
use crate::registry::{ClientHandle, ClientId, ClientRegistry};
use crate::session::{run_session, Disconnect, SessionEnd, SessionState};
use crate::telemetry::Fetcher;

use super::config::RelayConfig;

/// Handler for one accepted connection
pub struct Connection<F> {
    session_id: u64,
    socket: TcpStream,
    peer_addr: SocketAddr,
    config: RelayConfig,
    fetcher: Arc<F>,
    registry: Arc<ClientRegistry>,
}

impl<F: Fetcher> Connection<F> {
    /// Create a handler for a freshly accepted socket
    pub fn new(
        session_id: u64,
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: RelayConfig,
        fetcher: Arc<F>,
        registry: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            session_id,
            socket,
            peer_addr,
            config,
            fetcher,
            registry,
        }
    }

    /// Run the connection from handshake to teardown
    ///
    /// Returns how the session ended. Errors are handshake-phase only; once
    /// the client is registered every exit path goes through [`SessionEnd`].
    pub async fn run(self) -> Result<SessionEnd> {
        let ws = tokio::time::timeout(self.config.handshake_timeout, accept_async(self.socket))
            .await
            .map_err(|_| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "WebSocket handshake timed out",
                ))
            })??;

        let (sink, stream) = ws.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ClientId(self.session_id);

        self.registry.register(ClientHandle::new(id, tx)).await;

        tracing::info!(
            client = %id,
            peer = %self.peer_addr,
            "WebSocket connection established"
        );

        let writer = tokio::spawn(writer_task(sink, rx));
        let (close_tx, close_rx) = oneshot::channel();
        let reader = tokio::spawn(reader_task(stream, id, close_tx));

        let mut state = SessionState::new(id, self.peer_addr);
        let end = run_session(
            &mut state,
            &self.registry,
            self.fetcher.as_ref(),
            &self.config.session_key,
            self.config.poll_interval,
            close_rx,
        )
        .await;

        // The loop has deregistered the handle; stop the socket pumps
        writer.abort();
        reader.abort();

        match &end {
            SessionEnd::PeerClosed => {
                tracing::info!(
                    client = %id,
                    cycles = state.cycles,
                    duration_secs = state.duration().as_secs(),
                    "Session closed by peer"
                );
            }
            other => {
                tracing::warn!(
                    client = %id,
                    cycles = state.cycles,
                    end = %other,
                    "Session ended"
                );
            }
        }

        Ok(end)
    }
}

/// Writer task: drains the handle's channel into the WebSocket sink
///
/// Ends when the channel closes or a sink send fails; after that, registry
/// sends to this client fail and broadcast eviction takes over.
async fn writer_task(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if sink.send(msg).await.is_err() {
            break;
        }
    }
}

/// Reader task: watches the socket and classifies how it ends
///
/// The core consumes no client-to-server messages; inbound frames other than
/// Close are ignored.
async fn reader_task(
    mut stream: SplitStream<WebSocketStream<TcpStream>>,
    id: ClientId,
    close_tx: oneshot::Sender<Disconnect>,
) {
    let reason = loop {
        match stream.next().await {
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(client = %id, frame = ?frame, "Client initiated close");
                break Disconnect::Peer;
            }
            Some(Ok(_)) => {
                // Ignore inbound text/binary/ping/pong
            }
            Some(Err(e)) => {
                break Disconnect::Transport(e.to_string());
            }
            None => {
                // Stream ended without a close frame
                break Disconnect::Peer;
            }
        }
    };

    let _ = close_tx.send(reason);
}
