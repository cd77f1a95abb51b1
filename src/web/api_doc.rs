use utoipa::OpenApi;

use crate::feed::{PositionRecord, TimestampedPosition};
use crate::history::TrajectoryView;
use crate::weather::WeatherReport;

use super::api::error::ErrorResponse;
use super::api::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::balloon::get_balloon,
        super::api::history::get_history,
        super::api::history::get_trajectories,
        super::api::weather::get_weather,
        super::api::health::health,
    ),
    components(
        schemas(
            PositionRecord,
            TimestampedPosition,
            TrajectoryView,
            crate::history::Trajectory,
            WeatherReport,
            ErrorResponse,
            HealthResponse,
        )
    ),
    info(
        title = "Balloon-O-Mat API",
        description = "Balloon telemetry proxy, history aggregation and point weather",
        version = "0.1.0"
    ),
    tags(
        (name = "balloon", description = "Hourly feed snapshots"),
        (name = "history", description = "Recent positions and trajectories"),
        (name = "weather", description = "Current weather at a point"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;
