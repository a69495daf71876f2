// Candle and series model
pub mod candle;

// Live feed wire envelope
pub mod feed_event;

pub mod pattern;
pub mod quote;

// Aggregates and price change derived from a series
pub mod stats;

pub mod timeframe;

pub use candle::{Candle, CandleSeries};
pub use feed_event::FeedEvent;
pub use pattern::{Direction, PatternEvent, PatternType};
pub use quote::{StockPick, StockSnapshot};
pub use stats::{AggregateStats, PriceChange};
pub use timeframe::Timeframe;
