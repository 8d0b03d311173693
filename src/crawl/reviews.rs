//! Review continuation: collects a product's reviews one page at a time.
//!
//! Each review request carries the product snapshot accumulated so far. The
//! handler for page N merges that page into the snapshot and is the only
//! producer of the request for page N+1, so pages of one product are merged
//! strictly in order without any shared state between steps.

use crate::config::Config;
use crate::crawl::classifier::Classifier;
use crate::crawl::request::{Label, Request, RequestParams};
use crate::error::{CrawlError, CrawlResult};
use crate::walmart::models::{ProductRecord, ReviewModel, UNKNOWN_COUNT};
use anyhow::Result;
use tracing::{debug, error, info};

/// Validated context of a review request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewContext {
    pub sku: String,
    pub page_number: u32,
    pub product: ProductRecord,
}

impl ReviewContext {
    /// Extracts the chain context from a review request.
    ///
    /// SKU, a non-zero page number and the product snapshot are all required.
    pub fn from_request(request: &Request) -> CrawlResult<Self> {
        let data = &request.user_data;
        match (data.sku.as_deref(), data.page_number, data.product.as_deref()) {
            (Some(sku), Some(page_number), Some(product))
                if !sku.is_empty() && page_number > 0 =>
            {
                Ok(Self { sku: sku.to_string(), page_number, product: product.clone() })
            }
            _ => Err(CrawlError::MissingReviewContext { url: request.url.clone() }),
        }
    }
}

/// Outcome of merging one review page.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewStep {
    /// More pages remain; enqueue this request ahead of the backlog.
    Continue(Request),
    /// The thread is exhausted; persist this record.
    Complete(Box<ProductRecord>),
}

/// Review chains seeded from a batch of products.
#[derive(Debug, Default)]
pub struct SeededChains {
    /// Page-1 review requests, in product order.
    pub requests: Vec<Request>,
    /// One error per product that could not be seeded.
    pub skipped: Vec<CrawlError>,
}

/// Drives the per-product review chains.
#[derive(Debug, Clone)]
pub struct ReviewEngine {
    classifier: Classifier,
}

impl ReviewEngine {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self { classifier: Classifier::new(config)? })
    }

    /// Builds the first review request for a product.
    pub fn seed(&self, product: &ProductRecord) -> CrawlResult<Request> {
        let sku =
            product.sku().ok_or_else(|| CrawlError::MissingSku { url: product.url.clone() })?;
        self.review_request(sku, 1, product.clone())
    }

    /// Seeds one chain per product. Products without a SKU are logged and
    /// skipped; the rest are still seeded.
    pub fn seed_all<I>(&self, products: I) -> SeededChains
    where
        I: IntoIterator<Item = ProductRecord>,
    {
        let mut seeded = SeededChains::default();
        for product in products {
            match self.seed(&product) {
                Ok(request) => seeded.requests.push(request),
                Err(e) => {
                    error!(url = %product.url, title = %product.title, "{}, skipping", e);
                    seeded.skipped.push(e);
                }
            }
        }
        info!(
            "Seeded {} review chains, skipped {} products",
            seeded.requests.len(),
            seeded.skipped.len()
        );
        seeded
    }

    /// Merges a fetched page into the chain and decides whether to continue.
    ///
    /// The page count used for the decision is the one just merged. An unknown
    /// page count always continues.
    pub fn advance(&self, context: ReviewContext, page: ReviewModel) -> CrawlResult<ReviewStep> {
        let ReviewContext { sku, page_number, mut product } = context;

        product.reviews_model = std::mem::take(&mut product.reviews_model).merge(page);
        let max_page_number = product.reviews_model.pages_count;

        debug!(
            sku = %sku,
            page_number,
            max_page_number,
            collected = product.reviews_model.reviews.len(),
            "Merged review page"
        );

        if i64::from(page_number) < max_page_number || max_page_number == UNKNOWN_COUNT {
            match page_number.checked_add(1) {
                Some(next_page) => {
                    let next = self.review_request(&sku, next_page, product)?;
                    return Ok(ReviewStep::Continue(next));
                }
                None => error!(sku = %sku, page_number, "No page after the last page number"),
            }
        }

        info!(sku = %sku, page_number, max_page_number, "Extracting review data");
        Ok(ReviewStep::Complete(Box::new(product)))
    }

    fn review_request(
        &self,
        sku: &str,
        page_number: u32,
        product: ProductRecord,
    ) -> CrawlResult<Request> {
        let url = self.classifier.review_url(sku, page_number)?;
        Ok(self.classifier.classify(
            RequestParams::new(url).label(Label::Review).review(sku, page_number, product),
        ))
    }
}
