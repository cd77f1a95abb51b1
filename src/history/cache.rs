use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::feed::TimestampedPosition;

/// Positions across hours, most recent first. Shared so cache hits hand out the same data.
pub type TrajectoryDataset = Arc<Vec<TimestampedPosition>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    captured_at: DateTime<Utc>,
    data: TrajectoryDataset,
}

/// Single-slot cache for the last aggregated dataset.
#[derive(Debug)]
pub struct TrajectoryCache {
    ttl: Duration,
    slot: Option<CacheEntry>,
}

impl TrajectoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.slot.as_ref().is_some_and(|entry| {
            let age_ms = now.signed_duration_since(entry.captured_at).num_milliseconds();
            i128::from(age_ms) < self.ttl.as_millis() as i128
        })
    }

    pub fn get(&self, now: DateTime<Utc>) -> Option<TrajectoryDataset> {
        if self.is_fresh(now) {
            self.slot.as_ref().map(|entry| Arc::clone(&entry.data))
        } else {
            None
        }
    }

    pub fn put(&mut self, now: DateTime<Utc>, data: TrajectoryDataset) {
        self.slot = Some(CacheEntry {
            captured_at: now,
            data,
        });
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.slot.as_ref().map(|entry| entry.captured_at)
    }
}
