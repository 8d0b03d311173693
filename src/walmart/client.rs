//! HTTP client for Walmart pages using wreq for TLS fingerprint emulation.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// A fetched page: where the request ended up and what it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// URL after redirects. Blocked requests end up on `/blocked`.
    pub loaded_url: String,
    pub html: String,
}

/// Trait for page fetching - enables mocking for tests.
#[async_trait]
pub trait WalmartFetch: Send + Sync {
    /// Fetches a page and returns its final URL and HTML.
    async fn fetch(&self, url: &str) -> Result<Page>;
}

/// Walmart HTTP client with browser impersonation.
pub struct WalmartClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl WalmartClient {
    /// Creates a new Walmart client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.navigation_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, delay_ms: config.delay_ms, delay_jitter_ms: config.delay_jitter_ms })
    }

    /// Adds a random delay between requests.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl WalmartFetch for WalmartClient {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 {
            warn!("Rate limited (429). Consider using a proxy or increasing delay.");
            anyhow::bail!("Rate limited by Walmart. Try increasing --delay or using a proxy.");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        let loaded_url = response.uri().to_string();
        let html = response.text().await.context("Failed to read response body")?;

        Ok(Page { loaded_url, html })
    }
}
