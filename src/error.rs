//! Errors raised while turning fetched pages into further work.

use thiserror::Error;

/// Failure of a single unit of work (one listing expansion, one detail page or
/// one step of a product's review chain). None of these abort the crawl.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Maximum price ({max}) should be greater or equal to minimum price ({min})")]
    InvalidPriceBounds { min: f64, max: f64 },

    #[error("Start page ({start}) should be lesser or equal to final page ({last})")]
    InvalidPageRange { start: u32, last: u32 },

    #[error(
        "Final page ({last}) should be less or equal to the total number of pages of this \
         listing: {total} pages"
    )]
    PageRangeExceedsTotal { last: u32, total: u32 },

    #[error("Can't seed reviews for {url}: product has no SKU")]
    MissingSku { url: String },

    #[error("Missing sku, page number or product on review request {url}")]
    MissingReviewContext { url: String },

    #[error("Request blocked: {url}")]
    Blocked { url: String },

    #[error("No handler for request {url}")]
    Unclassified { url: String },

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse {url}: {message}")]
    Parse { url: String, message: String },
}

impl CrawlError {
    /// Returns true if the whole fetch should be attempted again.
    ///
    /// Only page-level failures qualify. Decision errors are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::Fetch { .. } | Self::Parse { .. })
    }
}

/// Result type for crawl decisions.
pub type CrawlResult<T> = Result<T, CrawlError>;
