use super::candle::CandleSeries;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Annualization factor for volatility, assuming one bar per trading day.
///
/// Applied regardless of the actual bar interval; use
/// [`AggregateStats::compute_with`] to supply a different factor.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Aggregates over the close prices and volumes of a candle series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    pub avg_volume: f64,
    /// Annualized standard deviation of simple returns, in percent.
    pub volatility: f64,
}

impl AggregateStats {
    /// Returns `None` for an empty series.
    pub fn compute(series: &CandleSeries) -> Option<Self> {
        Self::compute_with(series, TRADING_DAYS_PER_YEAR)
    }

    pub fn compute_with(series: &CandleSeries, periods_per_year: f64) -> Option<Self> {
        let first = series.latest()?;

        let mut high = first.close;
        let mut low = first.close;
        let mut volume_sum = 0u128;
        for candle in series {
            high = high.max(candle.close);
            low = low.min(candle.close);
            volume_sum += u128::from(candle.volume);
        }

        Some(Self {
            high,
            low,
            avg_volume: volume_sum as f64 / series.len() as f64,
            volatility: annualized_volatility(&series.closes(), periods_per_year),
        })
    }
}

/// `(p[i] - p[i-1]) / p[i-1]` for every consecutive pair.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Population standard deviation of simple returns, scaled by
/// `sqrt(periods_per_year)` and expressed as a percentage.
///
/// Fewer than two prices yield 0.
pub fn annualized_volatility(prices: &[f64], periods_per_year: f64) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns = simple_returns(prices);
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * periods_per_year.sqrt() * 100.0
}

/// Move of the most recent bar from its open to its close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    #[serde(with = "rust_decimal::serde::float")]
    pub change: Decimal,
    pub change_percent: f64,
}

impl PriceChange {
    pub const ZERO: PriceChange = PriceChange {
        change: Decimal::ZERO,
        change_percent: 0.0,
    };

    /// Intra-candle change of the latest bar; zero until the series holds two bars.
    pub fn from_series(series: &CandleSeries) -> Self {
        if series.len() < 2 {
            return Self::ZERO;
        }
        let Some(latest) = series.latest() else {
            return Self::ZERO;
        };

        let change = latest.close - latest.open;
        let change_percent = if latest.open.is_zero() {
            0.0
        } else {
            (change / latest.open * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        };

        Self {
            change,
            change_percent,
        }
    }
}
