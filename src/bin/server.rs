//! Candlefeed mock backend
//!
//! Serves the synthetic REST endpoints and the live candle feed so the
//! chart client can run without a real market data provider.
//!
//! # Usage
//! ```sh
//! HTTP_PORT=8002 WS_PORT=8003 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `HTTP_PORT` / `WS_PORT` - Listening ports (default: 8002 / 8003)
//! - `BIND_ADDRESS` - Interface to bind (default: 127.0.0.1)
//! - `FEED_UPDATE_INTERVAL_MS` - Candle cadence per connection (default: 2000)
//! - `FEED_HEARTBEAT_INTERVAL_MS` - Heartbeat cadence (default: 30000)
//! - `FEED_BACKFILL_CANDLES` - Candles in the initial snapshot (default: 100)
//! - `PATTERN_PROBABILITY` - Chance of a pattern per candle (default: 0.10)
//! - `FEED_SEED` - Fixed seed for reproducible feeds

use anyhow::Result;
use candlefeed::application::system::Application;
use candlefeed::config::ServerConfig;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Candlefeed mock backend {} starting...", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;
    info!(
        "Configuration loaded: HTTP={}, WS={}, seed={:?}",
        config.http_addr(),
        config.ws_addr(),
        config.feed.seed
    );

    let app = Application::build(config)?;
    let handle = app.start().await?;

    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting...");
    handle.shutdown().await;

    Ok(())
}
