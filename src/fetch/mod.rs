// src/fetch/mod.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::RetryConfig;

/// A downloaded page and when it was requested.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub body: String,
    pub requested_at: DateTime<Local>,
}

async fn get_text_core(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))
}

/// Delay before retry number `attempt` (1-based): doubles each time.
fn backoff(initial_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(initial_ms.saturating_mul(factor))
}

/// GET `url`, retrying failures with exponential backoff.
#[instrument(level = "info", skip(client, url, retry), fields(url = %url))]
pub async fn fetch_page(client: &Client, url: &Url, retry: &RetryConfig) -> Result<FetchedPage> {
    let requested_at = Local::now();
    let mut attempts = 0;
    let body = loop {
        match get_text_core(client, url).await {
            Ok(text) => break text,
            Err(e) if attempts < retry.max_retries => {
                attempts += 1;
                let delay = backoff(retry.initial_backoff_ms, attempts);
                warn!(attempt = attempts, delay_ms = delay.as_millis() as u64, error = %e, "Retrying");
                sleep(delay).await;
            }
            Err(e) => {
                error!(error = %e, "Exhausted retries");
                return Err(e);
            }
        }
    };
    info!(bytes = body.len(), "fetched page");
    Ok(FetchedPage {
        url: url.clone(),
        body,
        requested_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(500, 1), Duration::from_millis(500));
        assert_eq!(backoff(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff(500, 4), Duration::from_millis(4000));
        assert_eq!(backoff(500, 0), Duration::from_millis(500));
        assert_eq!(backoff(u64::MAX, 70), Duration::from_millis(u64::MAX));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        let client = Client::new();
        // port 9 on loopback refuses connections
        let url = Url::parse("http://127.0.0.1:9/districts.htm").unwrap();
        let retry = RetryConfig {
            max_retries: 1,
            initial_backoff_ms: 1,
        };
        let err = fetch_page(&client, &url, &retry).await.unwrap_err();
        assert!(err.to_string().contains("GET http://127.0.0.1:9/districts.htm failed"));
    }
}
