use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] FetchError),
    #[error("weather response could not be decoded: {0}")]
    Decode(String),
    #[error("Invalid weather data format")]
    InvalidFormat,
}
