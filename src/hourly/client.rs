use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;

use async_trait::async_trait;

use crate::feed::{parse_feed, PositionRecord};
use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::hourly::{HourError, HourOffset, HourSource};

pub const DEFAULT_FEED_URL: &str = "https://a.windbornesystems.com/treasure/{hour}.json";

/// Reads hourly snapshots straight from the upstream feed host.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url_template: String,
    policy: RetryPolicy,
}

impl FeedClient {
    pub fn new(client: Client, url_template: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            policy,
        }
    }

    pub fn feed_url(&self, hour: HourOffset) -> String {
        self.url_template.replace("{hour}", &hour.padded())
    }

    /// Raw body for an hour, with non-2xx responses reported as errors.
    pub async fn fetch_raw(&self, hour: HourOffset) -> Result<String, HourError> {
        let url = self.feed_url(hour);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "*/*")
            .header(CACHE_CONTROL, "no-store");

        let response = fetch_with_retry(request, &self.policy).await?;
        let status = response.status();
        if !status.is_success() {
            log::error!("HTTP error! status: {} ({})", status.as_u16(), url);
            return Err(HourError::UpstreamStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HourError::Request(e.into()))?;
        log::debug!("Raw feed response for hour {}: {}", hour, body);
        Ok(body)
    }
}

#[async_trait]
impl HourSource for FeedClient {
    async fn get_hour(&self, hour: HourOffset) -> Result<Vec<PositionRecord>, HourError> {
        let body = self.fetch_raw(hour).await?;
        Ok(parse_feed(&body))
    }
}
