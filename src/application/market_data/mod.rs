// Synthetic market data generators
pub mod candle_generator;
pub mod pattern_sampler;
pub mod quote_generator;

pub use candle_generator::CandleGenerator;
pub use pattern_sampler::PatternSampler;
pub use quote_generator::QuoteGenerator;
