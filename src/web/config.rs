use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::fetch::RetryPolicy;
use crate::history::HistorySettings;
use crate::hourly::FeedClient;
use crate::weather::{WeatherClient, DEFAULT_WEATHER_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web: WebConfig,
    pub feed: FeedConfig,
    pub history: HistoryConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    /// Front-end assets served at `/` when set.
    pub static_dir: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// `{hour}` is replaced by the zero-padded hour offset.
    pub url_template: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub retry_base_delay: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url_template: crate::hourly::DEFAULT_FEED_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 1,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl FeedConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_base_delay, false)
    }

    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }

    pub fn client(&self, policy: RetryPolicy) -> reqwest::Result<FeedClient> {
        Ok(FeedClient::new(
            self.http_client()?,
            self.url_template.clone(),
            policy,
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub candidate_hours: Vec<u8>,
    pub max_hours_back: u8,
    #[serde(deserialize_with = "deserialize_duration")]
    pub cache_ttl: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub politeness_delay: Duration,
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub retry_base_delay: Duration,
    /// Aggregate through another instance's `/api/balloon` instead of the feed host.
    pub proxy_url: Option<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let settings = HistorySettings::default();
        Self {
            candidate_hours: settings.candidate_hours,
            max_hours_back: settings.max_hours_back,
            cache_ttl: settings.cache_ttl,
            politeness_delay: settings.politeness_delay,
            max_attempts: 2,
            retry_base_delay: Duration::from_secs(1),
            proxy_url: None,
        }
    }
}

impl HistoryConfig {
    pub fn settings(&self) -> HistorySettings {
        HistorySettings {
            candidate_hours: self.candidate_hours.clone(),
            max_hours_back: self.max_hours_back,
            cache_ttl: self.cache_ttl,
            politeness_delay: self.politeness_delay,
        }
    }

    /// Only transport failures are retried; an error status is the hour's answer.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_base_delay, false)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub retry_base_delay: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl WeatherConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_base_delay, true)
    }

    pub fn client(&self) -> reqwest::Result<WeatherClient> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(WeatherClient::new(
            http,
            self.base_url.clone(),
            self.retry_policy(),
        ))
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults when no file is given.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(h) = self.history.candidate_hours.iter().find(|&&h| h > 23) {
            return Err(ConfigError::Invalid(format!(
                "candidate hour {} is outside 0-23",
                h
            )));
        }
        if self.history.max_hours_back > 23 {
            return Err(ConfigError::Invalid(format!(
                "max_hours_back {} is outside 0-23",
                self.history.max_hours_back
            )));
        }
        if !self.feed.url_template.contains("{hour}") {
            return Err(ConfigError::Invalid(
                "feed.url_template must contain {hour}".into(),
            ));
        }
        Ok(())
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}
