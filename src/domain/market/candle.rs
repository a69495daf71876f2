use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Prices carry two decimal places and travel as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    pub volume: u64,
}

impl Candle {
    /// `low <= min(open, close)`, `high >= max(open, close)` and `low <= high`.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
            && self.low <= self.high
    }
}

/// Chronological, append-only sequence of candles owned by a single subscription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Close prices as floats, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.candles
            .iter()
            .map(|c| c.close.to_f64().unwrap_or(0.0))
            .collect()
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self { candles }
    }
}

impl<'a> IntoIterator for &'a CandleSeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open,
            high,
            low,
            close,
            volume: 100_000,
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(candle(dec!(10.00), dec!(11.00), dec!(9.50), dec!(10.50)).is_well_formed());
        assert!(!candle(dec!(10.00), dec!(10.20), dec!(9.50), dec!(10.50)).is_well_formed());
        assert!(!candle(dec!(10.00), dec!(11.00), dec!(10.10), dec!(10.50)).is_well_formed());
    }

    #[test]
    fn test_series_keeps_insertion_order() {
        let mut series = CandleSeries::new();
        assert!(series.is_empty());
        assert!(series.latest().is_none());

        series.push(candle(dec!(1), dec!(2), dec!(1), dec!(1.5)));
        series.push(candle(dec!(1.5), dec!(3), dec!(1.5), dec!(2.5)));

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.5, 2.5]);
        assert_eq!(series.latest().map(|c| c.close), Some(dec!(2.5)));
    }

    #[test]
    fn test_prices_serialize_as_numbers() {
        let c = candle(dec!(150.25), dec!(151.00), dec!(149.75), dec!(150.50));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["open"], serde_json::json!(150.25));
        assert_eq!(json["volume"], serde_json::json!(100_000));
        assert!(json["timestamp"].is_string());
    }
}
