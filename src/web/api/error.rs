use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::hourly::{HourError, HourOffset};

pub enum ApiError {
    Validation(String),
    /// Upstream answered with a non-2xx status; mirrored to the client.
    UpstreamStatus(u16),
    /// Fetching an hour failed outright.
    HourFailed(HourOffset),
    WeatherUnavailable,
}

impl ApiError {
    pub fn from_hour_error(err: HourError, hour: HourOffset) -> Self {
        match err {
            HourError::UpstreamStatus(code) => ApiError::UpstreamStatus(code),
            HourError::InvalidHour(raw) => {
                ApiError::Validation(format!("invalid hour offset: {}", raw))
            }
            other => {
                log::error!("Error fetching balloon data for hour {}: {}", hour, other);
                ApiError::HourFailed(hour)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(&msg))).into_response()
            }
            ApiError::UpstreamStatus(code) => {
                let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = ErrorResponse::new(&format!("Failed to fetch balloon data: {}", code));
                (status, Json(body)).into_response()
            }
            ApiError::HourFailed(hour) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_hour("Failed to fetch balloon data", hour)),
            )
                .into_response(),
            ApiError::WeatherUnavailable => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("Weather data temporarily unavailable")),
            )
                .into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            hour: None,
        }
    }

    pub fn with_hour(error: &str, hour: HourOffset) -> Self {
        ErrorResponse {
            error: error.to_string(),
            hour: Some(hour.padded()),
        }
    }
}
