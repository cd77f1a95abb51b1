use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// A single balloon fix as reported by one hourly snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PositionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl PositionRecord {
    /// Builds a record only when every coordinate is finite.
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Option<Self> {
        if latitude.is_finite() && longitude.is_finite() && altitude.is_finite() {
            Some(Self {
                latitude,
                longitude,
                altitude,
            })
        } else {
            None
        }
    }

    pub fn at(self, timestamp: DateTime<Utc>) -> TimestampedPosition {
        TimestampedPosition {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            timestamp,
        }
    }
}

/// A position tagged with the time of the hourly snapshot it came from.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TimestampedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

fn serialize_millis<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
