//! URL classification and URL construction for the Walmart catalog.

use crate::config::Config;
use crate::crawl::request::{Label, Request, RequestParams, UserData};
use crate::error::{CrawlError, CrawlResult};
use anyhow::{Context, Result};
use url::Url;

/// URL fragments identifying each page kind.
pub mod patterns {
    pub const PRODUCT: &str = "/ip/";
    pub const REVIEW: &str = "/reviews/";
    pub const CATEGORY: &str = "/browse/";
    pub const KEYWORD: &str = "?q=";
    pub const BRAND: &str = "/brand/";
}

/// Assigns labels to URLs and builds the URLs the crawl emits.
#[derive(Debug, Clone)]
pub struct Classifier {
    base: Url,
}

impl Classifier {
    /// Creates a classifier rooted at the configured base URL.
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base URL: {}", config.base_url))?;
        Ok(Self { base })
    }

    /// Returns the label a URL resolves to, if any pattern matches.
    ///
    /// Patterns are tried in a fixed order and the first match wins: product
    /// pages, then review pages, then listing pages (category, keyword search
    /// or brand).
    pub fn label_for(url: &str) -> Option<Label> {
        if url.contains(patterns::PRODUCT) {
            Some(Label::Detail)
        } else if url.contains(patterns::REVIEW) {
            Some(Label::Review)
        } else if url.contains(patterns::CATEGORY)
            || url.contains(patterns::KEYWORD)
            || url.contains(patterns::BRAND)
        {
            Some(Label::Listing)
        } else {
            None
        }
    }

    /// Builds a request from its parameters.
    ///
    /// A matching URL pattern overrides the caller's label; with no match the
    /// caller's label is kept, and a request with neither is unclassified.
    pub fn classify(&self, params: RequestParams) -> Request {
        let label = Self::label_for(&params.url).or(params.label).unwrap_or(Label::Unclassified);

        Request {
            url: params.url,
            label,
            user_data: UserData {
                pagination: params.pagination,
                pricing: params.pricing,
                sku: params.sku,
                page_number: params.page_number,
                product: params.product.map(Box::new),
            },
            retry_count: 0,
        }
    }

    /// Search URL for a keyword.
    pub fn keyword_url(&self, keyword: &str) -> Result<String> {
        let mut url = self.base.join("search").context("Failed to build search URL")?;
        url.query_pairs_mut().append_pair("q", keyword);
        Ok(url.into())
    }

    /// Review page URL: `{base}reviews/product/{sku}?page={page_number}`.
    pub fn review_url(&self, sku: &str, page_number: u32) -> CrawlResult<String> {
        let mut url = self.base.join(&format!("reviews/product/{}", sku)).map_err(|e| {
            CrawlError::Parse { url: self.base.to_string(), message: e.to_string() }
        })?;
        url.query_pairs_mut().append_pair("page", &page_number.to_string());
        Ok(url.into())
    }

    /// The listing URL with its `page` parameter set to `page_number`.
    ///
    /// Other query parameters are kept in order.
    pub fn page_url(&self, listing_url: &str, page_number: u32) -> CrawlResult<String> {
        let mut url = Url::parse(listing_url).map_err(|e| CrawlError::Parse {
            url: listing_url.to_string(),
            message: e.to_string(),
        })?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("page", &page_number.to_string());

        Ok(url.into())
    }
}
