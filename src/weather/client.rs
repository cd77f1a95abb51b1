use reqwest::Client;

use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::weather::types::ForecastResponse;
use crate::weather::{WeatherError, WeatherReport};

pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,wind_speed_10m,wind_direction_10m,precipitation";

/// Open-Meteo current-conditions lookup.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl WeatherClient {
    pub fn new(client: Client, base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            policy,
        }
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherReport, WeatherError> {
        let request = self.client.get(&self.base_url).query(&[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ]);

        let response = fetch_with_retry(request, &self.policy).await?;
        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        body.current
            .map(WeatherReport::from)
            .ok_or(WeatherError::InvalidFormat)
    }
}
