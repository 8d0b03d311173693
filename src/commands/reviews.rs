//! Review pass: one review chain per product in the base dataset.

use crate::config::Config;
use crate::crawl::{CrawlStats, Crawler, Dataset, Datasets, RequestQueue, ReviewEngine};
use crate::walmart::{ProductRecord, WalmartClient, WalmartFetch};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Collects reviews for previously exported products.
pub struct ReviewsCommand {
    config: Config,
}

impl ReviewsCommand {
    /// Creates a new reviews command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the review pass over the base dataset.
    pub async fn execute(&self) -> Result<CrawlStats> {
        let client = WalmartClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(Arc::new(client)).await
    }

    /// Runs the review pass with a provided client (for testing).
    pub async fn execute_with_client<F: WalmartFetch + 'static>(
        &self,
        client: Arc<F>,
    ) -> Result<CrawlStats> {
        let products_path = self.config.products_path();
        let products: Vec<ProductRecord> = Dataset::items(&products_path)?;

        if products.is_empty() {
            warn!("No products in {}, nothing to review", products_path.display());
            return Ok(CrawlStats::default());
        }

        info!("Seeding review chains for {} products", products.len());

        let engine = ReviewEngine::new(&self.config)?;
        let mut queue = RequestQueue::new();
        let seeded = engine.seed_all(products);
        if !seeded.skipped.is_empty() {
            warn!("{} products have no SKU and get no reviews", seeded.skipped.len());
        }
        queue.add_all(seeded.requests);

        let mut datasets = Datasets::open(&self.config)?;
        let stats = Crawler::new(client, &self.config)?.run(&mut queue, &mut datasets).await?;

        info!(
            "Review pass wrote {} records to {}",
            datasets.reviews.pushed(),
            datasets.reviews.path().display()
        );
        Ok(stats)
    }
}
