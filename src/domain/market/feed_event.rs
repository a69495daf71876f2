use super::candle::Candle;
use super::pattern::PatternEvent;
use serde::{Deserialize, Serialize};

/// Envelope of every message on the live feed.
///
/// Serialized as `{"type": "...", "data": ...}`; `heartbeat` has no `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FeedEvent {
    Historical(Vec<Candle>),
    CandleUpdate(Candle),
    PatternDetected(PatternEvent),
    Heartbeat,
}

impl FeedEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Historical(_) => "historical",
            FeedEvent::CandleUpdate(_) => "candle_update",
            FeedEvent::PatternDetected(_) => "pattern_detected",
            FeedEvent::Heartbeat => "heartbeat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_heartbeat_has_no_payload() {
        let json = serde_json::to_string(&FeedEvent::Heartbeat).unwrap();
        assert_eq!(json, r#"{"type":"heartbeat"}"#);

        let parsed: FeedEvent = serde_json::from_str(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(parsed, FeedEvent::Heartbeat);
    }

    #[test]
    fn test_candle_update_envelope() {
        let event = FeedEvent::CandleUpdate(Candle {
            timestamp: Utc::now(),
            open: dec!(150.10),
            high: dec!(151.00),
            low: dec!(149.90),
            close: dec!(150.70),
            volume: 250_000,
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "candle_update");
        assert_eq!(json["data"]["close"], serde_json::json!(150.7));
        assert_eq!(event.kind(), "candle_update");
    }

    #[test]
    fn test_parses_backend_historical_message() {
        let raw = r#"{"type":"historical","data":[
            {"timestamp":"2024-01-01T00:00:00Z","open":150.1,"high":151.2,"low":149.8,"close":150.9,"volume":420000}
        ]}"#;

        match serde_json::from_str::<FeedEvent>(raw).unwrap() {
            FeedEvent::Historical(candles) => {
                assert_eq!(candles.len(), 1);
                assert_eq!(candles[0].volume, 420_000);
                assert_eq!(candles[0].close, dec!(150.9));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
