use crate::types::{FetchConfig, PosterError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    /// Download the raw feed document at `url`, retrying transport errors and
    /// non-success statuses with exponential backoff.
    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let delay = self.config.retry_delay_seconds;
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(delay),
            initial_interval: Duration::from_secs(delay),
            max_interval: Duration::from_secs(delay.saturating_mul(32)),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(delay.saturating_mul(60))),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.try_fetch(url).await {
                Ok(content) => {
                    info!(
                        "Fetched feed: {} ({} bytes in {}ms)",
                        url,
                        content.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(content);
                }
                // Oversized feeds won't shrink on retry.
                Err(e @ PosterError::FeedTooLarge { .. }) => return Err(e),
                Err(e) => {
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        error!("Failed to fetch feed after {} attempt(s): {}", self.config.max_retries + 1, url);
        Err(last_error.unwrap_or_else(|| PosterError::Fetch {
            url: url.to_string(),
            message: "Unknown error".to_string(),
        }))
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PosterError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {}: {}", status, status.canonical_reason().unwrap_or("Unknown")),
            });
        }

        let max_bytes = self.config.max_feed_size_mb * 1024 * 1024;
        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_bytes {
                return Err(too_large(url, content_length as usize));
            }
        }

        let content = response.text().await?;
        if content.len() > max_bytes {
            return Err(too_large(url, content.len()));
        }
        Ok(content)
    }
}

fn too_large(url: &str, bytes: usize) -> PosterError {
    PosterError::FeedTooLarge {
        url: url.to_string(),
        size_mb: bytes / (1024 * 1024),
    }
}
