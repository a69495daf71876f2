use crate::domain::market::{
    AggregateStats, CandleSeries, FeedEvent, PatternEvent, PriceChange, Timeframe,
};
use rust_decimal::Decimal;
use tracing::debug;

/// Consumer-side view of one symbol/timeframe feed.
///
/// Derived values are recomputed from the current series on every read.
#[derive(Debug, Clone)]
pub struct ChartState {
    candles: CandleSeries,
    patterns: Vec<PatternEvent>,
    current_price: Decimal,
    is_connected: bool,
    selected_symbol: String,
    selected_timeframe: Timeframe,
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new("AAPL", Timeframe::OneDay)
    }
}

impl ChartState {
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            candles: CandleSeries::new(),
            patterns: Vec::new(),
            current_price: Decimal::ZERO,
            is_connected: false,
            selected_symbol: symbol.to_string(),
            selected_timeframe: timeframe,
        }
    }

    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Historical(candles) => {
                self.candles = CandleSeries::from(candles);
                if let Some(latest) = self.candles.latest() {
                    self.current_price = latest.close;
                }
            }
            FeedEvent::CandleUpdate(candle) => {
                self.current_price = candle.close;
                self.candles.push(candle);
            }
            FeedEvent::PatternDetected(pattern) => {
                self.patterns.push(pattern);
            }
            FeedEvent::Heartbeat => {
                debug!("ChartState[{}]: heartbeat", self.selected_symbol);
            }
        }
    }

    /// Switching symbol or timeframe discards the previous feed's data.
    pub fn select(&mut self, symbol: &str, timeframe: Timeframe) {
        if symbol == self.selected_symbol && timeframe == self.selected_timeframe {
            return;
        }
        self.selected_symbol = symbol.to_string();
        self.selected_timeframe = timeframe;
        self.candles = CandleSeries::new();
        self.patterns.clear();
        self.current_price = Decimal::ZERO;
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected
    }

    pub fn candles(&self) -> &CandleSeries {
        &self.candles
    }

    pub fn patterns(&self) -> &[PatternEvent] {
        &self.patterns
    }

    pub fn current_price(&self) -> Decimal {
        self.current_price
    }

    pub fn selected_symbol(&self) -> &str {
        &self.selected_symbol
    }

    pub fn selected_timeframe(&self) -> Timeframe {
        self.selected_timeframe
    }

    pub fn price_change(&self) -> PriceChange {
        PriceChange::from_series(&self.candles)
    }

    pub fn candle_stats(&self) -> Option<AggregateStats> {
        AggregateStats::compute(&self.candles)
    }
}
