mod parser;
mod types;

pub use parser::parse_feed;
pub use types::{PositionRecord, TimestampedPosition};
