use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::feed::PositionRecord;
use crate::fetch::{fetch_with_retry, RetryPolicy};
use crate::hourly::{HourError, HourOffset, HourSource};

/// Reads hourly snapshots through another instance's `/api/balloon` endpoint.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProxyBody {
    Positions(Vec<PositionRecord>),
    Error { error: String },
}

impl ProxyClient {
    pub fn new(client: Client, base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Two attempts, one second apart; status codes are the proxy's answer, not a fault.
    pub fn default_policy() -> RetryPolicy {
        RetryPolicy::new(2, Duration::from_secs(1), false)
    }
}

#[async_trait]
impl HourSource for ProxyClient {
    async fn get_hour(&self, hour: HourOffset) -> Result<Vec<PositionRecord>, HourError> {
        let url = format!("{}/api/balloon?hour={}", self.base_url, hour.padded());
        let response = fetch_with_retry(self.client.get(&url), &self.policy).await?;
        let status = response.status().as_u16();

        let text = response
            .text()
            .await
            .map_err(|e| HourError::Request(e.into()))?;

        match serde_json::from_str::<ProxyBody>(&text) {
            Ok(ProxyBody::Positions(records)) => Ok(records),
            Ok(ProxyBody::Error { error }) => Err(HourError::Proxy {
                status,
                message: error,
            }),
            Err(e) => Err(HourError::Decode(e.to_string())),
        }
    }
}
