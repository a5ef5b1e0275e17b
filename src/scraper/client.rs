//! Rate-limited HTTP client for nar.netkeiba.com

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::retry::{retry, RetryConfig};

use super::cache::{Cache, CacheCategory};
use super::rate_limiter::RateLimiter;

/// Scraper errors
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    BadStatus {
        status: reqwest::StatusCode,
        url: String,
    },
}

/// What a fetch produced: a page, or a typed "not published yet"
pub enum Fetched {
    Page(String),
    NotAvailable,
}

/// HTTP client with rate limiting, retry and a page cache
pub struct FetchClient {
    client: reqwest::Client,
    limiter: RateLimiter,
    retry_config: RetryConfig,
    cache: Cache,
}

impl FetchClient {
    pub fn new(config: &ScraperConfig, cache_dir: PathBuf) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.requests_per_minute),
            retry_config: RetryConfig::with_max_retries(config.max_retries),
            cache: Cache::new(cache_dir),
        })
    }

    /// Fetch one page through the cache.
    ///
    /// A 404 is a typed `NotAvailable`: results pages return it until the
    /// race is made official, and retrying would not help.
    pub async fn fetch(
        &self,
        url: &str,
        category: CacheCategory,
        key: &str,
    ) -> Result<Fetched, ScrapeError> {
        if let Some(cached) = self.cache.get::<String>(category, key) {
            debug!(url, "cache hit");
            return Ok(Fetched::Page(cached));
        }

        info!(url, "fetching");
        // A 404 counts as a successful fetch of "nothing there yet", so it
        // does not burn retries.
        match retry(&self.retry_config, url, || self.get_page(url)).await? {
            Some(html) => {
                if let Err(e) = self.cache.set(category, key, &html) {
                    debug!(url, error = %e, "cache write failed");
                }
                Ok(Fetched::Page(html))
            }
            None => Ok(Fetched::NotAvailable),
        }
    }

    async fn get_page(&self, url: &str) -> Result<Option<String>, ScrapeError> {
        self.limiter.acquire().await;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ScrapeError::BadStatus {
                status,
                url: url.to_string(),
            });
        }

        // netkeiba serves EUC-JP
        Ok(Some(response.text_with_charset("EUC-JP").await?))
    }
}
