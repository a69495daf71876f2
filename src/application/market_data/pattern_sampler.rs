use crate::domain::errors::MarketDataError;
use crate::domain::market::{Direction, PatternEvent, PatternType};
use chrono::{DateTime, Utc};
use rand::Rng;

pub const DEFAULT_PATTERN_PROBABILITY: f64 = 0.10;

/// Emits randomly labeled pattern events alongside candle ticks.
///
/// This is not a pattern detector. Type, direction, confidence and strength
/// are drawn independently of any price data, so consumers must not read an
/// emitted `hammer` as a statement about the candles around it.
#[derive(Debug, Clone, Copy)]
pub struct PatternSampler {
    probability: f64,
}

impl PatternSampler {
    pub fn new(probability: f64) -> Result<Self, MarketDataError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(MarketDataError::InvalidProbability { value: probability });
        }
        Ok(Self { probability })
    }

    /// Fires with the configured probability; one Bernoulli draw per call.
    pub fn maybe_sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        timestamp: DateTime<Utc>,
    ) -> Option<PatternEvent> {
        if rng.random_bool(self.probability) {
            Some(Self::sample(rng, timestamp))
        } else {
            None
        }
    }

    /// Unconditional draw from the catalog.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, timestamp: DateTime<Utc>) -> PatternEvent {
        let pattern_type = PatternType::ALL[rng.random_range(0..PatternType::ALL.len())];
        let direction = if rng.random_bool(0.5) {
            Direction::Bullish
        } else {
            Direction::Bearish
        };

        PatternEvent {
            pattern_type,
            direction,
            confidence: draw_confidence(rng),
            strength: draw_strength(rng),
            timestamp,
        }
    }
}

impl Default for PatternSampler {
    fn default() -> Self {
        Self {
            probability: DEFAULT_PATTERN_PROBABILITY,
        }
    }
}

/// 0.7 + U(0, 0.3)
pub(crate) fn draw_confidence<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    0.7 + rng.random::<f64>() * 0.3
}

/// 1 + floor(U(0, 5))
pub(crate) fn draw_strength<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    1 + rng.random_range(0..5u8)
}
