use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candlestick pattern labels emitted by the synthetic feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Hammer,
    Doji,
    Engulfing,
    ShootingStar,
    MorningStar,
    HangingMan,
}

impl PatternType {
    /// Catalog the live feed samples from, in wire order.
    pub const ALL: [PatternType; 6] = [
        PatternType::Hammer,
        PatternType::Doji,
        PatternType::Engulfing,
        PatternType::ShootingStar,
        PatternType::MorningStar,
        PatternType::HangingMan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Hammer => "hammer",
            PatternType::Doji => "doji",
            PatternType::Engulfing => "engulfing",
            PatternType::ShootingStar => "shooting_star",
            PatternType::MorningStar => "morning_star",
            PatternType::HangingMan => "hanging_man",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
        }
    }
}

/// A labeled pattern event.
///
/// Events are drawn at random and carry no relation to the shape of any
/// candle in the stream; they exist to exercise chart annotations, not to
/// report technical-analysis findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEvent {
    pub pattern_type: PatternType,
    pub direction: Direction,
    /// In `[0, 1]`; the generators only produce `[0.7, 1.0)`.
    pub confidence: f64,
    /// In `[1, 5]`.
    pub strength: u8,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_wire_names() {
        let names: Vec<String> = PatternType::ALL
            .iter()
            .map(|p| serde_json::to_string(p).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "\"hammer\"",
                "\"doji\"",
                "\"engulfing\"",
                "\"shooting_star\"",
                "\"morning_star\"",
                "\"hanging_man\"",
            ]
        );
        for p in PatternType::ALL {
            assert_eq!(format!("\"{}\"", p), serde_json::to_string(&p).unwrap());
        }
    }

    #[test]
    fn test_event_json_shape() {
        let event = PatternEvent {
            pattern_type: PatternType::ShootingStar,
            direction: Direction::Bearish,
            confidence: 0.85,
            strength: 3,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["pattern_type"], "shooting_star");
        assert_eq!(json["direction"], "bearish");
        assert_eq!(json["strength"], 3);
    }
}
