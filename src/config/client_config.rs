//! API client configuration.

use super::env_lookup;
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base URL, without trailing slash
    pub api_url: String,
    /// WebSocket base URL, without trailing slash
    pub ws_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8002".to_string(),
            ws_url: "ws://localhost:8003".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("PATTERN_API_URL").unwrap_or(defaults.api_url);
        let ws_url = lookup("WS_URL").unwrap_or(defaults.ws_url);

        for (key, value) in [("PATTERN_API_URL", &api_url), ("WS_URL", &ws_url)] {
            url::Url::parse(value)
                .map_err(|e| anyhow::anyhow!("Invalid {}: '{}' ({})", key, value, e))?;
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            ws_url: ws_url.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_client_config_trims_trailing_slash() {
        let config = ClientConfig::from_lookup(|k| match k {
            "PATTERN_API_URL" => Some("https://patterns.example.com/".to_string()),
            "WS_URL" => Some("wss://patterns.example.com//".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.api_url, "https://patterns.example.com");
        assert_eq!(config.ws_url, "wss://patterns.example.com");
    }

    #[test]
    fn test_client_config_rejects_garbage_url() {
        assert!(ClientConfig::from_lookup(|k| (k == "WS_URL").then(|| "not a url".to_string())).is_err());
    }
}
