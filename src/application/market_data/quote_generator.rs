use super::pattern_sampler::{draw_confidence, draw_strength};
use crate::domain::market::{Direction, PatternEvent, PatternType, StockPick, StockSnapshot};
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;

/// Symbols served by the top-picks listing, in rank order.
pub const TOP_PICK_SYMBOLS: [&str; 10] = [
    "AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "META", "NVDA", "AMD", "INTC", "NFLX",
];

pub const PATTERN_BATCH_SIZE: usize = 5;

/// Synthetic payloads for the request/response endpoints.
pub struct QuoteGenerator;

impl QuoteGenerator {
    /// At most [`TOP_PICK_SYMBOLS`]`.len()` picks, whatever `count` asks for.
    pub fn top_picks<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<StockPick> {
        TOP_PICK_SYMBOLS
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, symbol)| StockPick {
                symbol: symbol.to_string(),
                name: format!("Company {}", i + 1),
                price: 150.0 + rng.random::<f64>() * 100.0,
                change: (rng.random::<f64>() - 0.5) * 10.0,
                volume: rng.random_range(0..10_000_000),
            })
            .collect()
    }

    pub fn stock_snapshot<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.to_string(),
            name: format!("{} Inc.", symbol),
            price: 150.0 + rng.random::<f64>() * 50.0,
            change: (rng.random::<f64>() - 0.5) * 10.0,
            change_percent: (rng.random::<f64>() - 0.5) * 5.0,
            volume: rng.random_range(0..10_000_000),
            market_cap: rng.random_range(0..1_000_000_000_000),
        }
    }

    /// Fixed-shape batch: types cycle through the first five catalog entries,
    /// directions alternate starting bullish, timestamps step back one hour.
    pub fn pattern_batch<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<PatternEvent> {
        (0..PATTERN_BATCH_SIZE)
            .map(|i| PatternEvent {
                pattern_type: PatternType::ALL[i % 5],
                direction: if i % 2 == 0 {
                    Direction::Bullish
                } else {
                    Direction::Bearish
                },
                confidence: draw_confidence(rng),
                strength: draw_strength(rng),
                timestamp: now - TimeDelta::hours(i as i64),
            })
            .collect()
    }
}
