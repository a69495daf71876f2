use crate::application::feed::LiveFeed;
use crate::config::ServerConfig;
use crate::infrastructure::http_api::{self, ApiState};
use crate::infrastructure::ws_server::FeedServer;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Handle on a running mock backend.
///
/// Dropping it without calling `shutdown` stops both servers as well, but
/// without waiting for open feeds to finish.
pub struct SystemHandle {
    pub http_addr: SocketAddr,
    pub ws_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    http_task: JoinHandle<()>,
    ws_task: JoinHandle<()>,
}

impl SystemHandle {
    /// Stops accepting requests and connections, then waits until every open
    /// live feed has been torn down.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.http_task.await {
            error!("HTTP API task failed during shutdown: {}", e);
        }
        if let Err(e) = self.ws_task.await {
            error!("Live feed task failed during shutdown: {}", e);
        }
        info!("Mock backend stopped");
    }
}

pub struct Application {
    pub config: ServerConfig,
    pub feed: Arc<LiveFeed>,
}

impl Application {
    pub fn build(config: ServerConfig) -> Result<Self> {
        info!(
            "Building mock backend (update every {}ms, heartbeat every {}ms, backfill {} candles)",
            config.feed.update_interval_ms,
            config.feed.heartbeat_interval_ms,
            config.feed.backfill_candles
        );
        config.feed.validate()?;
        let feed = LiveFeed::new(config.feed.clone()).context("Invalid feed configuration")?;

        Ok(Self {
            config,
            feed: Arc::new(feed),
        })
    }

    /// Binds both listeners, then serves them on background tasks.
    pub async fn start(self) -> Result<SystemHandle> {
        let http_listener = TcpListener::bind(self.config.http_addr())
            .await
            .with_context(|| format!("Failed to bind HTTP API on {}", self.config.http_addr()))?;
        let ws_listener = TcpListener::bind(self.config.ws_addr())
            .await
            .with_context(|| format!("Failed to bind live feed on {}", self.config.ws_addr()))?;

        let http_addr = http_listener.local_addr()?;
        let ws_addr = ws_listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let api_state = ApiState::new(self.feed.next_rng());
        let mut http_shutdown = shutdown_rx.clone();
        let http_signal = async move {
            let _ = http_shutdown.changed().await;
        };
        let http_task = tokio::spawn(async move {
            if let Err(e) = http_api::serve(http_listener, api_state, http_signal).await {
                error!("HTTP API stopped: {}", e);
            }
        });

        let feed_server = FeedServer::new(ws_listener, self.feed.clone());
        let ws_task = tokio::spawn(async move {
            if let Err(e) = feed_server.run(shutdown_rx).await {
                error!("Live feed server stopped: {}", e);
            }
        });

        info!("Mock backend ready: http://{} ws://{}", http_addr, ws_addr);

        Ok(SystemHandle {
            http_addr,
            ws_addr,
            shutdown_tx,
            http_task,
            ws_task,
        })
    }
}
