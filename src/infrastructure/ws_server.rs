//! WebSocket side of the mock backend: one synthetic live feed per connection.

use crate::application::feed::LiveFeed;
use crate::domain::errors::MarketDataError;
use crate::domain::market::{FeedEvent, Timeframe};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, error, info, warn};
use url::Url;

const LIVE_PATH_PREFIX: [&str; 2] = ["ws", "live"];
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Target of a live-feed handshake: `/ws/live/{symbol}?timeframe={tf}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRoute {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl FeedRoute {
    /// `timeframe` defaults to `1m` when absent.
    pub fn parse(path_and_query: &str) -> Result<Self, MarketDataError> {
        let not_found = || MarketDataError::RouteNotFound {
            path: path_and_query.to_string(),
        };

        let url = Url::parse("ws://localhost")
            .and_then(|base| base.join(path_and_query))
            .map_err(|_| not_found())?;

        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
        let [prefix_a, prefix_b, symbol] = segments.as_slice() else {
            return Err(not_found());
        };
        if [*prefix_a, *prefix_b] != LIVE_PATH_PREFIX {
            return Err(not_found());
        }

        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MarketDataError::InvalidSymbol {
                symbol: symbol.to_string(),
            });
        }

        let timeframe = url
            .query_pairs()
            .find(|(key, _)| key == "timeframe")
            .map(|(_, value)| Timeframe::from_str(&value))
            .transpose()?
            .unwrap_or(Timeframe::OneMin);

        Ok(Self {
            symbol: symbol.to_ascii_uppercase(),
            timeframe,
        })
    }
}

pub struct FeedServer {
    listener: TcpListener,
    feed: Arc<LiveFeed>,
}

impl FeedServer {
    pub fn new(listener: TcpListener, feed: Arc<LiveFeed>) -> Self {
        Self { listener, feed }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Each connection runs on its own task and owns its feed.
    ///
    /// Once `shutdown` flips to `true` (or its sender is dropped) the loop stops
    /// accepting and returns after every open connection has torn its feed down.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("Live feed listening on ws://{}", self.listener.local_addr()?);

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(handle_connection(
                            stream,
                            peer,
                            self.feed.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("FeedServer: accept failed: {}", e);
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    }
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("FeedServer: closing {} open connection(s)", connections.len());
        while connections.join_next().await.is_some() {}
        Ok(())
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    feed: Arc<LiveFeed>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut route = None;
    let callback = |request: &Request, response: Response| {
        let target = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        match FeedRoute::parse(target) {
            Ok(parsed) => {
                route = Some(parsed);
                Ok(response)
            }
            Err(e) => {
                warn!("FeedServer: rejecting {} from {}: {}", target, peer, e);
                let mut rejection = ErrorResponse::new(Some("Not found".to_string()));
                *rejection.status_mut() = StatusCode::NOT_FOUND;
                Err(rejection)
            }
        }
    };

    let handshake = tokio::select! {
        result = accept_hdr_async(stream, callback) => result,
        _ = shutdown.changed() => return,
    };
    let ws = match handshake {
        Ok(ws) => ws,
        Err(e) => {
            debug!("FeedServer: handshake with {} failed: {}", peer, e);
            return;
        }
    };
    let Some(route) = route else {
        return;
    };

    info!(
        "FeedServer: client {} connected for {} ({})",
        peer, route.symbol, route.timeframe
    );

    let (mut sink, mut source) = ws.split();
    let (tx, mut events) = mpsc::channel(feed.config().channel_capacity);
    let handle = feed.start(&route.symbol, route.timeframe, feed.next_rng(), tx);

    // Normal close, client error, send failure and server shutdown all leave
    // the loop the same way and go through the single teardown below.
    let outcome: Result<(), String> = loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break Ok(()) };
                let text = match encode_event(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        error!("FeedServer: failed to encode {} event: {}", event.kind(), e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    break Err(e.to_string());
                }
            }
            incoming = source.next() => match incoming {
                None | Some(Ok(Message::Close(_))) => break Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e.to_string()),
            },
            _ = shutdown.changed() => {
                let _ = sink.send(Message::Close(None)).await;
                break Ok(());
            }
        }
    };

    handle.shutdown().await;

    match outcome {
        Ok(()) => info!("FeedServer: client {} disconnected for {}", peer, route.symbol),
        Err(e) => warn!(
            "FeedServer: connection error for {} ({}): {}",
            route.symbol, peer, e
        ),
    }
}

/// Encodes one event the way it goes over the wire.
pub fn encode_event(event: &FeedEvent) -> serde_json::Result<String> {
    serde_json::to_string(event)
}
