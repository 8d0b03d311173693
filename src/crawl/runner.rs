//! Crawl runner: drains the request queue with bounded concurrency.

use crate::config::Config;
use crate::crawl::dataset::Datasets;
use crate::crawl::queue::RequestQueue;
use crate::crawl::request::{Label, Request};
use crate::crawl::router::{Action, Router};
use crate::error::CrawlError;
use crate::walmart::WalmartFetch;
use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Counters for a finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub handled: usize,
    pub retried: usize,
    /// Requests given up on: permanent errors or retries exhausted.
    pub failed: usize,
    pub products: usize,
    pub reviews: usize,
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} handled, {} retried, {} failed, {} products, {} review records",
            self.handled, self.retried, self.failed, self.products, self.reviews
        )
    }
}

/// Runs queued requests through a fetcher and the router.
pub struct Crawler<F: WalmartFetch + 'static> {
    fetcher: Arc<F>,
    router: Arc<Router>,
    max_concurrency: usize,
    max_request_retries: u32,
}

impl<F: WalmartFetch + 'static> Crawler<F> {
    pub fn new(fetcher: Arc<F>, config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher,
            router: Arc::new(Router::new(config)?),
            max_concurrency: config.max_concurrency.max(1),
            max_request_retries: config.max_request_retries,
        })
    }

    /// Runs until the queue is empty and nothing is in flight.
    ///
    /// Failures end only the request they happen on. Only dataset writes
    /// abort the run.
    pub async fn run(
        &self,
        queue: &mut RequestQueue,
        datasets: &mut Datasets,
    ) -> Result<CrawlStats> {
        let mut stats = CrawlStats::default();
        let mut in_flight: JoinSet<(Request, Result<Vec<Action>, CrawlError>)> = JoinSet::new();

        info!("Starting crawl with {} queued requests", queue.len());

        loop {
            while in_flight.len() < self.max_concurrency {
                let Some(request) = queue.pop() else {
                    break;
                };

                if request.label == Label::Unclassified {
                    error!(
                        label = %request.label,
                        url = %request.url,
                        "Can't handle request, skipping"
                    );
                    stats.failed += 1;
                    continue;
                }

                let fetcher = Arc::clone(&self.fetcher);
                let router = Arc::clone(&self.router);
                in_flight.spawn(async move {
                    let outcome = match fetcher.fetch(&request.url).await {
                        Ok(page) => router.handle(&request, &page),
                        Err(e) => Err(CrawlError::Fetch {
                            url: request.url.clone(),
                            message: format!("{:#}", e),
                        }),
                    };
                    (request, outcome)
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let (request, outcome) = joined.context("Request handler panicked")?;

            match outcome {
                Ok(actions) => {
                    stats.handled += 1;
                    self.apply(actions, queue, datasets, &mut stats)?;
                }
                Err(e) if e.is_retryable() && request.retry_count < self.max_request_retries => {
                    let mut request = request;
                    request.retry_count += 1;
                    warn!(
                        url = %request.url,
                        attempt = request.retry_count,
                        "{}, retrying",
                        e
                    );
                    stats.retried += 1;
                    queue.reclaim(request);
                }
                Err(e) => {
                    error!(label = %request.label, url = %request.url, "{}", e);
                    stats.failed += 1;
                }
            }
        }

        info!("Crawl finished: {} ({} unique URLs queued)", stats, queue.seen_count());
        Ok(stats)
    }

    fn apply(
        &self,
        actions: Vec<Action>,
        queue: &mut RequestQueue,
        datasets: &mut Datasets,
        stats: &mut CrawlStats,
    ) -> Result<()> {
        for action in actions {
            match action {
                Action::Enqueue(request) => {
                    queue.add(request);
                }
                Action::EnqueueForefront(request) => {
                    queue.add_forefront(request);
                }
                Action::PushProduct(product) => {
                    debug!("Exporting {}", product.url);
                    datasets.products.push(&product)?;
                    stats.products += 1;
                }
                Action::PushReview(product) => {
                    datasets.reviews.push(&product)?;
                    stats.reviews += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::classifier::Classifier;
    use crate::crawl::dataset::Dataset;
    use crate::crawl::request::{PaginationBounds, RequestParams};
    use crate::walmart::{Page, ProductRecord};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const LISTING: &str = include_str!("../../tests/fixtures/listing.html");
    const PRODUCT: &str = include_str!("../../tests/fixtures/product.html");
    const BLOCKED: &str = include_str!("../../tests/fixtures/blocked.html");

    /// Serves canned pages; the first `blocked_attempts` fetches of each URL
    /// get the challenge page.
    struct MockFetcher {
        pages: HashMap<String, String>,
        blocked_attempts: u32,
        attempts: Mutex<HashMap<String, u32>>,
        calls: AtomicU32,
    }

    impl MockFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, h)| (u.to_string(), h.to_string())).collect(),
                blocked_attempts: 0,
                attempts: Mutex::new(HashMap::new()),
                calls: AtomicU32::new(0),
            }
        }

        fn blocked_for(mut self, attempts: u32) -> Self {
            self.blocked_attempts = attempts;
            self
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WalmartFetch for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                let n = attempts.entry(url.to_string()).or_insert(0);
                *n += 1;
                *n
            };
            if attempt <= self.blocked_attempts {
                return Ok(Page { loaded_url: url.to_string(), html: BLOCKED.to_string() });
            }

            match self.pages.get(url) {
                Some(html) => Ok(Page { loaded_url: url.to_string(), html: html.clone() }),
                None => anyhow::bail!("Request failed with status: 404 Not Found"),
            }
        }
    }

    fn config(dir: &TempDir) -> Config {
        Config {
            storage_dir: dir.path().to_path_buf(),
            max_concurrency: 2,
            max_request_retries: 2,
            ..Config::default()
        }
    }

    fn queue_of(config: &Config, params: Vec<RequestParams>) -> RequestQueue {
        let classifier = Classifier::new(config).unwrap();
        let mut queue = RequestQueue::new();
        queue.add_all(params.into_iter().map(|p| classifier.classify(p)));
        queue
    }

    #[tokio::test]
    async fn test_listing_to_products() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = Arc::new(MockFetcher::new(&[
            ("https://www.walmart.com/browse/kitchen/623679", LISTING),
            ("https://www.walmart.com/ip/Electric-Kettle-1-7L/111", PRODUCT),
            ("https://www.walmart.com/ip/2-Slice-Toaster/222", PRODUCT),
        ]));

        let mut queue = queue_of(
            &config,
            vec![RequestParams::new("https://www.walmart.com/browse/kitchen/623679")],
        );
        let mut datasets = Datasets::open(&config).unwrap();

        let crawler = Crawler::new(Arc::clone(&fetcher), &config).unwrap();
        let stats = crawler.run(&mut queue, &mut datasets).await.unwrap();

        assert_eq!(stats.handled, 3);
        assert_eq!(stats.products, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(fetcher.call_count(), 3);

        let products: Vec<ProductRecord> = Dataset::items(config.products_path()).unwrap();
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_paginated_listing_fetches_each_page_once() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = Arc::new(MockFetcher::new(&[
            ("https://www.walmart.com/search?q=kettle", LISTING),
            ("https://www.walmart.com/search?q=kettle&page=1", LISTING),
            ("https://www.walmart.com/search?q=kettle&page=2", LISTING),
            ("https://www.walmart.com/ip/Electric-Kettle-1-7L/111", PRODUCT),
            ("https://www.walmart.com/ip/2-Slice-Toaster/222", PRODUCT),
        ]));

        let mut queue = queue_of(
            &config,
            vec![RequestParams::new("https://www.walmart.com/search?q=kettle")
                .pagination(Some(PaginationBounds::new(0, 0)))],
        );
        let mut datasets = Datasets::open(&config).unwrap();

        let stats = Crawler::new(Arc::clone(&fetcher), &config)
            .unwrap()
            .run(&mut queue, &mut datasets)
            .await
            .unwrap();

        // Seed, two pages, two distinct products
        assert_eq!(stats.handled, 5);
        assert_eq!(stats.products, 2);
        assert_eq!(fetcher.call_count(), 5);
    }

    #[tokio::test]
    async fn test_blocked_requests_are_retried() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = Arc::new(
            MockFetcher::new(&[("https://www.walmart.com/ip/Kettle/111", PRODUCT)])
                .blocked_for(2),
        );

        let mut queue =
            queue_of(&config, vec![RequestParams::new("https://www.walmart.com/ip/Kettle/111")]);
        let mut datasets = Datasets::open(&config).unwrap();

        let stats = Crawler::new(Arc::clone(&fetcher), &config)
            .unwrap()
            .run(&mut queue, &mut datasets)
            .await
            .unwrap();

        assert_eq!(stats.retried, 2);
        assert_eq!(stats.products, 1);
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = Arc::new(
            MockFetcher::new(&[("https://www.walmart.com/ip/Kettle/111", PRODUCT)])
                .blocked_for(10),
        );

        let mut queue =
            queue_of(&config, vec![RequestParams::new("https://www.walmart.com/ip/Kettle/111")]);
        let mut datasets = Datasets::open(&config).unwrap();

        let stats = Crawler::new(Arc::clone(&fetcher), &config)
            .unwrap()
            .run(&mut queue, &mut datasets)
            .await
            .unwrap();

        // First attempt plus two retries
        assert_eq!(fetcher.call_count(), 3);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.products, 0);
    }

    #[tokio::test]
    async fn test_unclassified_skipped_without_fetch() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let fetcher = Arc::new(MockFetcher::new(&[]));

        let mut queue =
            queue_of(&config, vec![RequestParams::new("https://www.walmart.com/cart")]);
        let mut datasets = Datasets::open(&config).unwrap();

        let stats = Crawler::new(Arc::clone(&fetcher), &config)
            .unwrap()
            .run(&mut queue, &mut datasets)
            .await
            .unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let mut datasets = Datasets::open(&config).unwrap();

        let stats = Crawler::new(Arc::new(MockFetcher::new(&[])), &config)
            .unwrap()
            .run(&mut RequestQueue::new(), &mut datasets)
            .await
            .unwrap();

        assert_eq!(stats, CrawlStats::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = CrawlStats { handled: 3, retried: 1, failed: 0, products: 2, reviews: 0 };
        assert_eq!(
            stats.to_string(),
            "3 handled, 1 retried, 0 failed, 2 products, 0 review records"
        );
    }
}
