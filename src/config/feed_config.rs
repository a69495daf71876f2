//! Live feed configuration: timer periods, backfill size and sampler odds.

use super::{env_lookup, parse_var};
use crate::application::market_data::pattern_sampler::DEFAULT_PATTERN_PROBABILITY;
use anyhow::{Result, bail};
use std::time::Duration;

/// Upper bound on the initial snapshot size.
pub const MAX_BACKFILL_CANDLES: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub update_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub backfill_candles: usize,
    pub pattern_probability: f64,
    /// Per-subscription event buffer; events beyond it are dropped.
    pub channel_capacity: usize,
    /// Fixed seed for reproducible feeds. Each subscription derives its own stream.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 2000,
            heartbeat_interval_ms: 30000,
            backfill_candles: 100,
            pattern_probability: DEFAULT_PATTERN_PROBABILITY,
            channel_capacity: 64,
            seed: None,
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = match lookup("FEED_SEED") {
            Some(_) => Some(parse_var(&lookup, "FEED_SEED", 0u64)?),
            None => None,
        };

        let config = Self {
            update_interval_ms: parse_var(
                &lookup,
                "FEED_UPDATE_INTERVAL_MS",
                defaults.update_interval_ms,
            )?,
            heartbeat_interval_ms: parse_var(
                &lookup,
                "FEED_HEARTBEAT_INTERVAL_MS",
                defaults.heartbeat_interval_ms,
            )?,
            backfill_candles: parse_var(&lookup, "FEED_BACKFILL_CANDLES", defaults.backfill_candles)?,
            pattern_probability: parse_var(
                &lookup,
                "PATTERN_PROBABILITY",
                defaults.pattern_probability,
            )?,
            channel_capacity: parse_var(&lookup, "FEED_CHANNEL_CAPACITY", defaults.channel_capacity)?,
            seed,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_interval_ms == 0 {
            bail!("FEED_UPDATE_INTERVAL_MS must be greater than 0");
        }
        if self.heartbeat_interval_ms == 0 {
            bail!("FEED_HEARTBEAT_INTERVAL_MS must be greater than 0");
        }
        if self.backfill_candles > MAX_BACKFILL_CANDLES {
            bail!(
                "FEED_BACKFILL_CANDLES must be at most {}, got {}",
                MAX_BACKFILL_CANDLES,
                self.backfill_candles
            );
        }
        if self.channel_capacity == 0 {
            bail!("FEED_CHANNEL_CAPACITY must be greater than 0");
        }
        if !(0.0..=1.0).contains(&self.pattern_probability) {
            bail!(
                "PATTERN_PROBABILITY must be within [0, 1], got {}",
                self.pattern_probability
            );
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}
