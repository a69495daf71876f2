use crate::domain::market::Candle;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

const MIN_VOLUME: u64 = 100_000;
const VOLUME_SPREAD: u64 = 1_000_000;

/// Random-walk OHLCV bar generator.
///
/// `open` drifts up to 1.00 away from the base price, `close` up to 1.50 away
/// from `open`, and the wicks extend up to 1.00 beyond the body. Chaining each
/// call on the previous close yields a random-walk price path.
pub struct CandleGenerator;

impl CandleGenerator {
    pub fn generate<R: Rng + ?Sized>(
        base_price: Decimal,
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> Candle {
        let base = base_price.to_f64().unwrap_or(0.0);

        let open = base + rng.random_range(-1.0..1.0);
        let close = open + rng.random_range(-1.5..1.5);
        let high = open.max(close) + rng.random::<f64>();
        let low = open.min(close) - rng.random::<f64>();
        let volume = rng.random_range(0..VOLUME_SPREAD) + MIN_VOLUME;

        let open = round_price(open);
        let close = round_price(close);
        // Rounding is monotonic, the clamp only guards the bounds against
        // float-to-decimal conversion edge cases.
        let high = round_price(high).max(open.max(close));
        let low = round_price(low).min(open.min(close));

        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `count` chained candles spaced `interval` apart, the newest one
    /// `interval` before `end`. Slots whose timestamp falls outside chrono's
    /// range are skipped.
    pub fn backfill<R: Rng + ?Sized>(
        base_price: Decimal,
        end: DateTime<Utc>,
        count: usize,
        interval: TimeDelta,
        rng: &mut R,
    ) -> Vec<Candle> {
        let mut candles = Vec::with_capacity(count);
        let mut price = base_price;

        for i in (1..=count).rev() {
            let Some(timestamp) = i32::try_from(i)
                .ok()
                .and_then(|n| interval.checked_mul(n))
                .and_then(|offset| end.checked_sub_signed(offset))
            else {
                continue;
            };
            let candle = Self::generate(price, timestamp, rng);
            price = candle.close;
            candles.push(candle);
        }

        candles
    }
}

fn round_price(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}
