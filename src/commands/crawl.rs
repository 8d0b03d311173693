//! Base crawl command: listings and product pages into the product dataset.

use crate::config::Config;
use crate::crawl::{Classifier, CrawlInput, CrawlStats, Crawler, Datasets, RequestQueue};
use crate::walmart::{WalmartClient, WalmartFetch};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the base pass.
pub struct CrawlCommand {
    config: Config,
}

impl CrawlCommand {
    /// Creates a new crawl command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Crawls from the given seeds.
    pub async fn execute(&self, input: &CrawlInput) -> Result<CrawlStats> {
        let client = WalmartClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(Arc::new(client), input).await
    }

    /// Crawls with a provided client (for testing).
    pub async fn execute_with_client<F: WalmartFetch + 'static>(
        &self,
        client: Arc<F>,
        input: &CrawlInput,
    ) -> Result<CrawlStats> {
        if input.is_empty() {
            anyhow::bail!("Nothing to crawl. Provide product URLs, listing URLs or keywords.");
        }
        self.config.validate_pricing()?;

        let pagination = self.config.pagination();
        let pricing = self.config.pricing();
        debug!(?pagination, ?pricing, "Crawl bounds");

        let classifier = Classifier::new(&self.config)?;
        let mut queue = RequestQueue::new();
        queue.add_all(input.requests(&classifier, pagination, pricing)?);

        let mut datasets = Datasets::open(&self.config)?;
        let stats = Crawler::new(client, &self.config)?.run(&mut queue, &mut datasets).await?;

        info!(
            "Base crawl wrote {} products to {}",
            datasets.products.pushed(),
            datasets.products.path().display()
        );
        Ok(stats)
    }
}
