use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current conditions at a point.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// Degrees Celsius.
    pub temperature: f64,
    /// km/h.
    pub wind_speed: f64,
    /// Degrees.
    pub wind_direction: f64,
    /// mm.
    pub precipitation: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ForecastResponse {
    pub current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CurrentConditions {
    pub temperature_2m: f64,
    pub wind_speed_10m: f64,
    pub wind_direction_10m: f64,
    pub precipitation: f64,
}

impl From<CurrentConditions> for WeatherReport {
    fn from(c: CurrentConditions) -> Self {
        WeatherReport {
            temperature: c.temperature_2m,
            wind_speed: c.wind_speed_10m,
            wind_direction: c.wind_direction_10m,
            precipitation: c.precipitation,
        }
    }
}
