//! End-to-end relay tests over real WebSocket connections

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use pitwall_rs::registry::ClientRegistry;
use pitwall_rs::server::{Connection, RelayConfig};
use pitwall_rs::telemetry::{DriverInfo, FetchError, Fetcher, SessionInfo, Snapshot};

type ClientWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Always returns the same snapshot, optionally failing while `fail` is set
struct StubFetcher {
    snapshot: Snapshot,
    fail: AtomicBool,
}

impl StubFetcher {
    fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch_snapshot(
        &self,
        _session_key: &str,
    ) -> std::result::Result<Snapshot, FetchError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(FetchError::NoSession)
        } else {
            Ok(self.snapshot.clone())
        }
    }
}

fn sample_snapshot() -> Snapshot {
    Snapshot::new(
        vec![DriverInfo {
            driver_number: 1,
            team_colour: "3671C6".into(),
            name_acronym: "VER".into(),
            full_name: "Max Verstappen".into(),
            team_name: "Red Bull Racing".into(),
        }],
        SessionInfo {
            circuit_short_name: "Monza".into(),
            date_start: "2025-09-05T12:30:00+00:00".into(),
            location: "Monza".into(),
            session_name: "Practice 1".into(),
            session_type: "Practice".into(),
        },
    )
}

/// Bind an ephemeral port and serve connections like the listener does
async fn spawn_relay(
    fetcher: Arc<StubFetcher>,
    registry: Arc<ClientRegistry>,
    poll_interval: Duration,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = RelayConfig::with_addr(addr).poll_interval(poll_interval);

    tokio::spawn(async move {
        let mut next_id = 1u64;
        loop {
            let (socket, peer_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => break,
            };
            let connection = Connection::new(
                next_id,
                socket,
                peer_addr,
                config.clone(),
                Arc::clone(&fetcher),
                Arc::clone(&registry),
            );
            next_id += 1;
            tokio::spawn(async move {
                let _ = connection.run().await;
            });
        }
    });

    addr
}

async fn connect(addr: SocketAddr) -> ClientWs {
    let (ws, _) = connect_async(format!("ws://{}", addr)).await.unwrap();
    ws
}

/// Receive the next text frame, skipping any control frames
async fn next_text(ws: &mut ClientWs) -> String {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => break text.to_string(),
                Some(Ok(_)) => continue,
                other => panic!("connection ended while awaiting text: {:?}", other),
            }
        }
    })
    .await
    .expect("timed out waiting for a text frame")
}

/// Poll until the registry reaches the expected size
async fn wait_for_len(registry: &ClientRegistry, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.len().await != expected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("registry never reached size {}", expected));
}

#[tokio::test]
async fn two_clients_receive_identical_payload_then_one_disconnects() {
    let registry = Arc::new(ClientRegistry::new());
    let fetcher = Arc::new(StubFetcher::new(sample_snapshot()));
    let addr = spawn_relay(fetcher, Arc::clone(&registry), Duration::from_millis(50)).await;

    let mut ws1 = connect(addr).await;
    let mut ws2 = connect(addr).await;
    wait_for_len(&registry, 2).await;

    // Both clients see the identical snapshot payload
    let m1 = next_text(&mut ws1).await;
    let m2 = next_text(&mut ws2).await;
    assert_eq!(m1, m2);

    let value: serde_json::Value = serde_json::from_str(&m1).unwrap();
    assert_eq!(value["session"]["session_name"], "Practice 1");
    assert_eq!(value["drivers"][0]["driver_number"], 1);
    assert_eq!(value["drivers"][0]["name_acronym"], "VER");

    // Client 1 disconnects; the registry settles at one entry
    ws1.close(None).await.unwrap();
    wait_for_len(&registry, 1).await;

    // Client 2 keeps receiving cycles
    let m3 = next_text(&mut ws2).await;
    let value: serde_json::Value = serde_json::from_str(&m3).unwrap();
    assert_eq!(value["session"]["session_name"], "Practice 1");
}

#[tokio::test]
async fn abrupt_client_drop_is_cleaned_up() {
    let registry = Arc::new(ClientRegistry::new());
    let fetcher = Arc::new(StubFetcher::new(sample_snapshot()));
    let addr = spawn_relay(fetcher, Arc::clone(&registry), Duration::from_millis(50)).await;

    let mut ws = connect(addr).await;
    wait_for_len(&registry, 1).await;
    let _ = next_text(&mut ws).await;

    // No close frame, the socket just goes away
    drop(ws);
    wait_for_len(&registry, 0).await;
}

#[tokio::test]
async fn fetch_failure_tears_down_only_the_failing_loop() {
    let registry = Arc::new(ClientRegistry::new());
    let fetcher = Arc::new(StubFetcher::new(sample_snapshot()));
    let addr = spawn_relay(Arc::clone(&fetcher), Arc::clone(&registry), Duration::from_millis(50)).await;

    // While the upstream is down, a new connection's loop fails its first
    // fetch and deregisters itself
    fetcher.fail.store(true, Ordering::SeqCst);
    let mut ws1 = connect(addr).await;

    // The server side is torn down; the client observes the stream ending
    let ended = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws1.next().await {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(_)) => break,
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "client never observed the teardown");
    wait_for_len(&registry, 0).await;

    // Upstream recovers; a fresh connection gets a working loop
    fetcher.fail.store(false, Ordering::SeqCst);
    let mut ws2 = connect(addr).await;
    wait_for_len(&registry, 1).await;

    let payload = next_text(&mut ws2).await;
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(value["drivers"][0]["full_name"], "Max Verstappen");
}
