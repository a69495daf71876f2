//! Configuration module for candlefeed.
//!
//! Settings are loaded from environment variables (after `dotenvy` has read
//! any `.env` file), organized by concern: live feed, mock backend server,
//! and API client.

mod client_config;
mod feed_config;
mod server_config;

pub use client_config::ClientConfig;
pub use feed_config::FeedConfig;
pub use server_config::ServerConfig;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Reads `key` through `lookup`, falling back to `default` when unset.
/// A value that is present but unparsable is an error, never silently replaced.
fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid {}: '{}'", key, raw)),
        None => Ok(default),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_var_default_and_override() {
        let vars: HashMap<&str, &str> = HashMap::from([("PORT", " 9000 "), ("BAD", "nine")]);
        let lookup = |k: &str| vars.get(k).map(|v| v.to_string());

        assert_eq!(parse_var(&lookup, "PORT", 80u16).unwrap(), 9000);
        assert_eq!(parse_var(&lookup, "MISSING", 80u16).unwrap(), 80);

        let err = parse_var(&lookup, "BAD", 80u16).unwrap_err();
        assert!(err.to_string().contains("Invalid BAD"));
    }
}
