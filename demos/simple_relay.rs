//! Minimal telemetry relay
//!
//! Serves the latest session over `ws://0.0.0.0:8000`, polling the public
//! OpenF1 API every 3 seconds.
//!
//! Run with: `cargo run --example simple_relay`

use pitwall_rs::server::{RelayConfig, RelayServer};
use pitwall_rs::telemetry::OpenF1Fetcher;

#[tokio::main]
async fn main() -> pitwall_rs::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitwall_rs=info".into()),
        )
        .init();

    let config = RelayConfig::default();
    let fetcher = OpenF1Fetcher::new(config.upstream_base_url.clone());
    let server = RelayServer::new(config, fetcher);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
