use serde::{Deserialize, Serialize};

/// Entry of the top-picks listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPick {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub volume: u64,
}

/// Point-in-time quote for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_uses_camel_case() {
        let snapshot = StockSnapshot {
            symbol: "AAPL".to_string(),
            name: "AAPL Inc.".to_string(),
            price: 172.5,
            change: -1.25,
            change_percent: -0.72,
            volume: 1_000,
            market_cap: 2_000_000,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["changePercent"], -0.72);
        assert_eq!(json["marketCap"], 2_000_000);
        assert!(json.get("change_percent").is_none());
    }
}
