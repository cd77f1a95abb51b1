use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum HourError {
    #[error("invalid hour offset: {0}")]
    InvalidHour(String),
    #[error("Failed to fetch balloon data: {0}")]
    UpstreamStatus(u16),
    #[error("request failed: {0}")]
    Request(#[from] FetchError),
    #[error("proxy returned {status}: {message}")]
    Proxy { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}
