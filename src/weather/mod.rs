mod client;
mod error;
mod types;

pub use client::{WeatherClient, DEFAULT_WEATHER_URL};
pub use error::WeatherError;
pub use types::WeatherReport;
