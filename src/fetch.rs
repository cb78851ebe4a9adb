use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::{Config, RetryPolicy};

/// Fetches page bodies with a fixed per-request timeout.
///
/// Failures are logged once and surface as `None`; callers treat that as
/// "this unit yields nothing".
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl PageFetcher {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            timeout: config.page_timeout,
            retry: config.retry,
        }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fetch `url` and return its body text, or `None` after logging a warning.
    pub async fn load_page(&self, url: &str) -> Option<String> {
        match self.fetch_with_retry(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to load page {}: {:#}", url, e);
                None
            }
        }
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retry.retries => {
                    let backoff = self.retry.delay(attempt);
                    debug!(
                        "Fetch of {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        url,
                        attempt + 1,
                        self.retry.retries + 1,
                        backoff.as_secs_f64(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
