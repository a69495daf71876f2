pub mod api_client;
pub mod http_api;
pub mod ws_server;

pub use api_client::{ApiClient, LiveStream};
pub use ws_server::FeedServer;
