use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("request cannot be retried")]
    NotRetryable,
    #[error("failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<FetchError>,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
