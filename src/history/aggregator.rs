use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::feed::TimestampedPosition;
use crate::history::{Clock, TrajectoryCache, TrajectoryDataset};
use crate::hourly::{HourOffset, HourSource};

pub const DEFAULT_MAX_HOURS_BACK: u8 = 23;

#[derive(Debug, Clone)]
pub struct HistorySettings {
    /// Hours tried in order; the first one that yields data wins.
    pub candidate_hours: Vec<u8>,
    pub max_hours_back: u8,
    pub cache_ttl: Duration,
    pub politeness_delay: Duration,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            candidate_hours: vec![0, 1, 2, 3],
            max_hours_back: DEFAULT_MAX_HOURS_BACK,
            cache_ttl: Duration::from_secs(60),
            politeness_delay: Duration::from_millis(200),
        }
    }
}

/// Assembles recent balloon positions from hourly snapshots.
///
/// Hours are queried one after another, most recent first, and the walk stops
/// at the first hour that produces anything. A non-empty result is cached for
/// `cache_ttl`. The cache lock is held for the whole refresh, so concurrent
/// callers wait for the in-flight aggregation and then read its result.
pub struct HistoryAggregator {
    source: Arc<dyn HourSource>,
    clock: Arc<dyn Clock>,
    settings: HistorySettings,
    cache: Mutex<TrajectoryCache>,
}

impl HistoryAggregator {
    pub fn new(
        source: Arc<dyn HourSource>,
        clock: Arc<dyn Clock>,
        settings: HistorySettings,
    ) -> Self {
        let cache = Mutex::new(TrajectoryCache::new(settings.cache_ttl));
        Self {
            source,
            clock,
            settings,
            cache,
        }
    }

    /// Candidate hours no older than `max_hours_back`, in configured order.
    pub fn candidates(&self, max_hours_back: Option<u8>) -> Vec<HourOffset> {
        let limit = max_hours_back
            .unwrap_or(self.settings.max_hours_back)
            .min(self.settings.max_hours_back);

        self.settings
            .candidate_hours
            .iter()
            .filter(|&&h| h <= limit)
            .filter_map(|&h| HourOffset::new(h))
            .collect()
    }

    pub async fn get_history(&self, max_hours_back: Option<u8>) -> TrajectoryDataset {
        let mut cache = self.cache.lock().await;

        if let Some(data) = cache.get(self.clock.now()) {
            log::debug!(
                "Serving {} cached positions from {:?}",
                data.len(),
                cache.captured_at()
            );
            return data;
        }

        let candidates = self.candidates(max_hours_back);
        let mut results: Vec<TimestampedPosition> = Vec::new();

        for (i, hour) in candidates.iter().enumerate() {
            let timestamp =
                self.clock.now() - chrono::Duration::hours(i64::from(hour.hours()));

            match self.source.get_hour(*hour).await {
                Ok(records) => {
                    log::debug!("Hour {} returned {} positions", hour, records.len());
                    results.extend(records.into_iter().map(|r| r.at(timestamp)));
                }
                Err(e) => log::warn!("Error fetching balloon data for hour {}: {}", hour, e),
            }

            if !results.is_empty() {
                break;
            }

            if i + 1 < candidates.len() && !self.settings.politeness_delay.is_zero() {
                tokio::time::sleep(self.settings.politeness_delay).await;
            }
        }

        sort_most_recent_first(&mut results);
        let data = Arc::new(results);

        if data.is_empty() {
            log::info!("No balloon data found in hours {:?}", candidates);
        } else {
            cache.put(self.clock.now(), Arc::clone(&data));
        }

        data
    }
}

fn sort_most_recent_first(positions: &mut [TimestampedPosition]) {
    positions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::feed::PositionRecord;
    use crate::history::clock::testing::ManualClock;
    use crate::hourly::HourError;

    enum Script {
        Records(Vec<PositionRecord>),
        Status(u16),
    }

    /// Replays canned answers per hour and records which hours were asked for.
    #[derive(Default)]
    struct ScriptedSource {
        answers: HashMap<u8, Script>,
        calls: StdMutex<Vec<u8>>,
    }

    impl ScriptedSource {
        fn with(mut self, hour: u8, script: Script) -> Self {
            self.answers.insert(hour, script);
            self
        }

        fn calls(&self) -> Vec<u8> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HourSource for ScriptedSource {
        async fn get_hour(&self, hour: HourOffset) -> Result<Vec<PositionRecord>, HourError> {
            self.calls.lock().unwrap().push(hour.hours());
            match self.answers.get(&hour.hours()) {
                Some(Script::Records(records)) => Ok(records.clone()),
                Some(Script::Status(code)) => Err(HourError::UpstreamStatus(*code)),
                None => Ok(Vec::new()),
            }
        }
    }

    fn rec(lat: f64, lon: f64, alt: f64) -> PositionRecord {
        PositionRecord::new(lat, lon, alt).unwrap()
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap()
    }

    fn quiet() -> HistorySettings {
        HistorySettings {
            politeness_delay: Duration::ZERO,
            ..HistorySettings::default()
        }
    }

    fn aggregator(
        source: Arc<ScriptedSource>,
        clock: Arc<ManualClock>,
        settings: HistorySettings,
    ) -> HistoryAggregator {
        HistoryAggregator::new(source, clock, settings)
    }

    #[tokio::test]
    async fn stops_at_first_hour_with_data() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(0, Script::Records(vec![rec(1.0, 2.0, 3.0)]))
                .with(1, Script::Records(vec![rec(4.0, 5.0, 6.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        let data = agg.get_history(None).await;

        assert_eq!(source.calls(), vec![0]);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].timestamp, start());
    }

    #[tokio::test]
    async fn older_hour_is_timestamped_by_offset() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(1, Script::Records(vec![rec(1.0, 2.0, 3.0), rec(4.0, 5.0, 6.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        let data = agg.get_history(None).await;

        assert_eq!(source.calls(), vec![0, 1]);
        assert_eq!(data.len(), 2);
        let expected = start() - chrono::Duration::milliseconds(3_600_000);
        assert!(data.iter().all(|p| p.timestamp == expected));
        assert_eq!(data[0].latitude, 1.0);
        assert_eq!(data[1].latitude, 4.0);
    }

    #[tokio::test]
    async fn failures_are_skipped() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(0, Script::Status(500))
                .with(1, Script::Status(404))
                .with(2, Script::Records(vec![rec(7.0, 8.0, 9.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        let data = agg.get_history(None).await;

        assert_eq!(source.calls(), vec![0, 1, 2]);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].timestamp, start() - chrono::Duration::hours(2));
    }

    #[tokio::test]
    async fn all_failures_give_empty_dataset() {
        let source = Arc::new(
            ScriptedSource::default()
                .with(0, Script::Status(502))
                .with(1, Script::Status(502))
                .with(2, Script::Status(502))
                .with(3, Script::Status(502)),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        assert!(agg.get_history(None).await.is_empty());
        assert_eq!(source.calls(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn repeat_call_within_ttl_is_served_from_cache() {
        let source = Arc::new(
            ScriptedSource::default().with(0, Script::Records(vec![rec(1.0, 2.0, 3.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), Arc::clone(&clock), quiet());

        let first = agg.get_history(None).await;
        clock.advance(chrono::Duration::seconds(59));
        let second = agg.get_history(None).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), vec![0]);
    }

    #[tokio::test]
    async fn expired_cache_triggers_refetch() {
        let source = Arc::new(
            ScriptedSource::default().with(0, Script::Records(vec![rec(1.0, 2.0, 3.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), Arc::clone(&clock), quiet());

        let first = agg.get_history(None).await;
        clock.advance(chrono::Duration::seconds(60));
        let second = agg.get_history(None).await;

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), vec![0, 0]);
        assert_eq!(second[0].timestamp, start() + chrono::Duration::seconds(60));
    }

    #[tokio::test]
    async fn empty_result_is_not_cached() {
        let source = Arc::new(ScriptedSource::default());
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        agg.get_history(None).await;
        agg.get_history(None).await;

        assert_eq!(source.calls(), vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn max_hours_back_caps_candidates() {
        let source = Arc::new(ScriptedSource::default());
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        agg.get_history(Some(1)).await;

        assert_eq!(source.calls(), vec![0, 1]);
    }

    #[test]
    fn default_candidates_ignore_deep_history() {
        let source = Arc::new(ScriptedSource::default());
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(source, clock, quiet());

        let hours: Vec<u8> = agg.candidates(None).iter().map(|h| h.hours()).collect();
        assert_eq!(hours, vec![0, 1, 2, 3]);
        let hours: Vec<u8> = agg.candidates(Some(200)).iter().map(|h| h.hours()).collect();
        assert_eq!(hours, vec![0, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_empty_hours() {
        let source = Arc::new(ScriptedSource::default());
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, HistorySettings::default());

        let started = tokio::time::Instant::now();
        agg.get_history(None).await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(600), "waited {elapsed:?}");
        assert!(elapsed < Duration::from_millis(800), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let source = Arc::new(
            ScriptedSource::default().with(0, Script::Records(vec![rec(1.0, 2.0, 3.0)])),
        );
        let clock = Arc::new(ManualClock::new(start()));
        let agg = aggregator(Arc::clone(&source), clock, quiet());

        let (a, b) = tokio::join!(agg.get_history(None), agg.get_history(None));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.calls(), vec![0]);
    }

    #[test]
    fn sorts_newest_first() {
        let base = start();
        let mut positions = vec![
            rec(1.0, 1.0, 1.0).at(base - chrono::Duration::hours(3)),
            rec(2.0, 2.0, 2.0).at(base),
            rec(3.0, 3.0, 3.0).at(base - chrono::Duration::hours(1)),
            rec(4.0, 4.0, 4.0).at(base),
        ];
        sort_most_recent_first(&mut positions);

        let lats: Vec<f64> = positions.iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![2.0, 4.0, 3.0, 1.0]);
    }
}
