use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::feed::TimestampedPosition;
use crate::history::{build_view, TrajectoryDataset, TrajectoryView};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub max_hours_back: Option<u8>,
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("max_hours_back" = Option<u8>, Query, description = "Oldest hour offset to consider (default 23)")
    ),
    responses(
        (status = 200, description = "Recent positions, newest first; empty when nothing is available", body = Vec<TimestampedPosition>)
    ),
    tag = "history"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<TrajectoryDataset> {
    Json(state.history.get_history(query.max_hours_back).await)
}

#[utoipa::path(
    get,
    path = "/api/trajectories",
    responses(
        (status = 200, description = "Current positions and per-balloon paths", body = TrajectoryView)
    ),
    tag = "history"
)]
pub async fn get_trajectories(State(state): State<AppState>) -> Json<TrajectoryView> {
    let data = state.history.get_history(None).await;
    Json(build_view(&data))
}
