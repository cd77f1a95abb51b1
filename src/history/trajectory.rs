use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::feed::{PositionRecord, TimestampedPosition};

pub const DEFAULT_CENTER: [f64; 2] = [37.7749, -122.4194];

/// All positions reported by one hourly snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampGroup {
    pub timestamp: DateTime<Utc>,
    pub positions: Vec<PositionRecord>,
}

/// Path of one balloon, identified by its index within each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Trajectory {
    pub balloon: usize,
    /// `[lat, lon]` pairs, most recent first.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrajectoryView {
    #[schema(value_type = Vec<f64>)]
    pub center: [f64; 2],
    pub current: Vec<TimestampedPosition>,
    pub trajectories: Vec<Trajectory>,
}

/// Groups by timestamp, newest group first, keeping dataset order inside a group.
pub fn group_by_timestamp(dataset: &[TimestampedPosition]) -> Vec<TimestampGroup> {
    let mut groups: Vec<TimestampGroup> = Vec::new();

    for p in dataset {
        let record = PositionRecord {
            latitude: p.latitude,
            longitude: p.longitude,
            altitude: p.altitude,
        };
        match groups.iter_mut().find(|g| g.timestamp == p.timestamp) {
            Some(group) => group.positions.push(record),
            None => groups.push(TimestampGroup {
                timestamp: p.timestamp,
                positions: vec![record],
            }),
        }
    }

    groups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    groups
}

pub fn build_trajectories(groups: &[TimestampGroup]) -> Vec<Trajectory> {
    let Some(current) = groups.first() else {
        return Vec::new();
    };

    (0..current.positions.len())
        .map(|index| Trajectory {
            balloon: index,
            points: groups
                .iter()
                .filter_map(|g| g.positions.get(index))
                .map(|p| [p.latitude, p.longitude])
                .collect(),
        })
        .filter(|t| t.points.len() > 1)
        .collect()
}

pub fn build_view(dataset: &[TimestampedPosition]) -> TrajectoryView {
    let groups = group_by_timestamp(dataset);

    let current: Vec<TimestampedPosition> = groups
        .first()
        .map(|g| g.positions.iter().map(|p| p.at(g.timestamp)).collect())
        .unwrap_or_default();

    let center = current
        .first()
        .map(|p| [p.latitude, p.longitude])
        .unwrap_or(DEFAULT_CENTER);

    TrajectoryView {
        center,
        current,
        trajectories: build_trajectories(&groups),
    }
}
