// Synthetic data generators
pub mod market_data;

// Per-connection live feed
pub mod feed;

// Consumer-side chart state
pub mod chart_state;

// Mock backend orchestrator
pub mod system;
