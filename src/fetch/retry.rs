use std::time::Duration;

use reqwest::{RequestBuilder, Response};

use crate::fetch::FetchError;

/// Bounded retry with linear backoff: attempt `n` failing waits `base_delay * n`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Whether a non-2xx response counts as a failed attempt. When false the
    /// response is handed back as-is and the caller decides what the status means.
    pub retry_on_status: bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, retry_on_status: bool) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            retry_on_status,
        }
    }

    /// One shot, status passed through.
    #[cfg(test)]
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO, false)
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

pub async fn fetch_with_retry(
    request: RequestBuilder,
    policy: &RetryPolicy,
) -> Result<Response, FetchError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let req = request.try_clone().ok_or(FetchError::NotRetryable)?;

        let err = match req.send().await {
            Ok(resp) if resp.status().is_success() || !policy.retry_on_status => return Ok(resp),
            Ok(resp) => FetchError::Status(resp.status().as_u16()),
            Err(e) => FetchError::from(e),
        };

        if attempt >= max_attempts {
            return Err(FetchError::RetriesExhausted {
                attempts: max_attempts,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_after(attempt);
        log::warn!(
            "Attempt {}/{} failed ({}), retrying in {:?}",
            attempt,
            max_attempts,
            err,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
