//! Mock backend server configuration.

use super::{FeedConfig, env_lookup, parse_var};
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_address: IpAddr,
    pub http_port: u16,
    pub ws_port: u16,
    pub feed: FeedConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::from([127, 0, 0, 1]),
            http_port: 8002,
            ws_port: 8003,
            feed: FeedConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            bind_address: parse_var(&lookup, "BIND_ADDRESS", defaults.bind_address)?,
            http_port: parse_var(&lookup, "HTTP_PORT", defaults.http_port)?,
            ws_port: parse_var(&lookup, "WS_PORT", defaults.ws_port)?,
            feed: FeedConfig::from_lookup(&lookup).context("Failed to load feed config")?,
        })
    }

    /// Both servers on ephemeral ports, for tests and embedding.
    pub fn ephemeral(feed: FeedConfig) -> Self {
        Self {
            http_port: 0,
            ws_port: 0,
            feed,
            ..Self::default()
        }
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }

    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.ws_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.http_addr().to_string(), "127.0.0.1:8002");
        assert_eq!(config.ws_addr().to_string(), "127.0.0.1:8003");
    }

    #[test]
    fn test_server_config_overrides() {
        let config = ServerConfig::from_lookup(|k| match k {
            "BIND_ADDRESS" => Some("0.0.0.0".to_string()),
            "WS_PORT" => Some("9100".to_string()),
            "FEED_BACKFILL_CANDLES" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.ws_addr().to_string(), "0.0.0.0:9100");
        assert_eq!(config.http_port, 8002);
        assert_eq!(config.feed.backfill_candles, 5);
    }

    #[test]
    fn test_server_config_invalid_port() {
        let result = ServerConfig::from_lookup(|k| (k == "HTTP_PORT").then(|| "70000".to_string()));
        assert!(result.is_err());
    }
}
