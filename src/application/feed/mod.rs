// Per-connection synthetic live feed
pub mod live_feed;

pub use live_feed::{FeedHandle, LiveFeed, Subscription};
