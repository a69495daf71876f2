//! Client for the pattern backend's REST endpoints and live feed.
//!
//! Failures are reported as [`ApiError`] and never retried here.

use crate::config::ClientConfig;
use crate::domain::errors::ApiError;
use crate::domain::market::{FeedEvent, PatternEvent, StockPick, StockSnapshot, Timeframe};
use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

pub struct ApiClient {
    base_url: String,
    ws_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, ws_url: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!("ApiClient: client builder failed ({}), using defaults without timeouts", e);
                Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ws_url: ws_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_url, &config.ws_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_top_picks(&self, count: usize) -> Result<Vec<StockPick>, ApiError> {
        let url = format!("{}/api/picks/top/{}", self.base_url, count);
        self.get_json("picks", &url, &[]).await
    }

    pub async fn get_stock_details(&self, symbol: &str) -> Result<StockSnapshot, ApiError> {
        let url = format!("{}/api/stock/{}", self.base_url, symbol);
        self.get_json("stock details", &url, &[]).await
    }

    pub async fn get_patterns(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        days: u32,
    ) -> Result<Vec<PatternEvent>, ApiError> {
        let url = format!("{}/api/patterns/{}", self.base_url, symbol);
        let query = [
            ("timeframe", timeframe.to_string()),
            ("days", days.to_string()),
        ];
        self.get_json("patterns", &url, &query).await
    }

    pub fn live_feed_url(&self, symbol: &str, timeframe: Timeframe) -> String {
        format!("{}/ws/live/{}?timeframe={}", self.ws_url, symbol, timeframe)
    }

    pub async fn connect_live(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<LiveStream, ApiError> {
        let url = self.live_feed_url(symbol, timeframe);
        info!("ApiClient: connecting to live feed {}", url);

        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| ApiError::WebSocket {
                reason: e.to_string(),
            })?;

        Ok(LiveStream { ws })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        debug!("ApiClient: GET {}", url);

        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

/// An open live-feed connection.
pub struct LiveStream {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl LiveStream {
    /// Next decoded event; `Ok(None)` once the server closes the feed.
    pub async fn next_event(&mut self) -> Result<Option<FeedEvent>, ApiError> {
        while let Some(message) = self.ws.next().await {
            let message = message.map_err(|e| ApiError::WebSocket {
                reason: e.to_string(),
            })?;

            match message {
                Message::Text(text) => {
                    let event = serde_json::from_str::<FeedEvent>(text.as_str()).map_err(|e| {
                        ApiError::Decode {
                            endpoint: "live feed".to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    return Ok(Some(event));
                }
                Message::Close(_) => return Ok(None),
                _ => continue,
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ApiError> {
        self.ws
            .send(Message::Close(None))
            .await
            .map_err(|e| ApiError::WebSocket {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_trim_trailing_slash() {
        let client = ApiClient::new("http://localhost:8002/", "ws://localhost:8003/");
        assert_eq!(client.base_url(), "http://localhost:8002");
        assert_eq!(
            client.live_feed_url("AAPL", Timeframe::FiveMin),
            "ws://localhost:8003/ws/live/AAPL?timeframe=5m"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ApiClient::new(
            &format!("http://127.0.0.1:{}", port),
            &format!("ws://127.0.0.1:{}", port),
        );
        let err = client.get_top_picks(5).await.unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed { .. }), "{:?}", err);

        let err = client.connect_live("AAPL", Timeframe::OneMin).await.err().unwrap();
        assert!(matches!(err, ApiError::WebSocket { .. }), "{:?}", err);
    }
}
