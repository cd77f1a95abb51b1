use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::weather::WeatherReport;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
}

#[utoipa::path(
    get,
    path = "/api/weather",
    params(
        ("lat" = f64, Query, description = "Latitude in degrees"),
        ("lon" = f64, Query, description = "Longitude in degrees")
    ),
    responses(
        (status = 200, description = "Current weather", body = WeatherReport),
        (status = 400, description = "Invalid coordinates", body = ErrorResponse),
        (status = 502, description = "Weather provider unavailable", body = ErrorResponse)
    ),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> ApiResult<Json<WeatherReport>> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return Err(ApiError::Validation("coordinates out of range".into()));
    }

    state
        .weather
        .current(query.lat, query.lon)
        .await
        .map(Json)
        .map_err(|e| {
            log::error!("Error fetching weather: {}", e);
            ApiError::WeatherUnavailable
        })
}
