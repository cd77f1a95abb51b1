mod client;
mod error;
mod proxy_client;
mod source;

pub use client::{FeedClient, DEFAULT_FEED_URL};
pub use error::HourError;
pub use proxy_client::ProxyClient;
pub use source::{HourOffset, HourSource};
