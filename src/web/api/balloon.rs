use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::feed::PositionRecord;
use crate::hourly::{HourOffset, HourSource};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BalloonQuery {
    pub hour: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/balloon",
    params(
        ("hour" = Option<String>, Query, description = "Hour offset 00-23, 00 is the latest snapshot")
    ),
    responses(
        (status = 200, description = "Positions in the snapshot, possibly none", body = Vec<PositionRecord>),
        (status = 400, description = "Invalid hour", body = ErrorResponse),
        (status = 500, description = "Fetching the snapshot failed", body = ErrorResponse),
        (status = "default", description = "Upstream error status, mirrored", body = ErrorResponse)
    ),
    tag = "balloon"
)]
pub async fn get_balloon(
    State(state): State<AppState>,
    Query(query): Query<BalloonQuery>,
) -> ApiResult<Json<Vec<PositionRecord>>> {
    let raw = query
        .hour
        .as_deref()
        .filter(|h| !h.is_empty())
        .unwrap_or("00");
    let hour: HourOffset = raw
        .parse()
        .map_err(|e: crate::hourly::HourError| ApiError::Validation(e.to_string()))?;

    let records = state
        .feed
        .get_hour(hour)
        .await
        .map_err(|e| ApiError::from_hour_error(e, hour))?;

    Ok(Json(records))
}
