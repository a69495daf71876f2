use thiserror::Error;

/// Errors raised while validating market-data requests and generator settings
#[derive(Debug, Error, PartialEq)]
pub enum MarketDataError {
    #[error("Unknown timeframe: '{value}'. Valid options: 1m, 5m, 15m, 1h, 4h, 1d")]
    UnknownTimeframe { value: String },

    #[error("Invalid symbol: '{symbol}'")]
    InvalidSymbol { symbol: String },

    #[error("Route not found: {path}")]
    RouteNotFound { path: String },

    #[error("Pattern probability must be within [0, 1], got {value}")]
    InvalidProbability { value: f64 },
}

/// Errors surfaced by the API client when the backend misbehaves or is unreachable
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    #[error("Failed to fetch {endpoint}: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Failed to fetch {endpoint}: HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Invalid {endpoint} payload: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Live feed connection failed: {reason}")]
    WebSocket { reason: String },
}
