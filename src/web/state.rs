use std::sync::Arc;

use crate::history::{HistoryAggregator, SystemClock};
use crate::hourly::{FeedClient, HourSource, ProxyClient};
use crate::weather::WeatherClient;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Serves `/api/balloon`: one request per call, status passed back to the caller.
    pub feed: Arc<FeedClient>,
    pub history: Arc<HistoryAggregator>,
    pub weather: Arc<WeatherClient>,
}

impl AppState {
    pub fn from_config(config: Config) -> reqwest::Result<Self> {
        let feed = config.feed.client(config.feed.retry_policy())?;
        let history = build_aggregator(&config)?;
        let weather = config.weather.client()?;

        Ok(Self {
            config: Arc::new(config),
            feed: Arc::new(feed),
            history: Arc::new(history),
            weather: Arc::new(weather),
        })
    }
}

/// Aggregator reading either a remote proxy or the feed host directly.
pub fn build_aggregator(config: &Config) -> reqwest::Result<HistoryAggregator> {
    let policy = config.history.retry_policy();
    let source: Arc<dyn HourSource> = match &config.history.proxy_url {
        Some(url) => {
            log::info!("Aggregating history through proxy at {}", url);
            Arc::new(ProxyClient::new(
                config.feed.http_client()?,
                url.clone(),
                policy,
            ))
        }
        None => Arc::new(config.feed.client(policy)?),
    };

    Ok(HistoryAggregator::new(
        source,
        Arc::new(SystemClock),
        config.history.settings(),
    ))
}
