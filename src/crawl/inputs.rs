//! Crawl seeds: product URLs, listing URLs and search keywords.

use crate::crawl::classifier::Classifier;
use crate::crawl::request::{PaginationBounds, PriceBounds, Request, RequestParams};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// What to start a base crawl from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlInput {
    pub product_urls: Vec<String>,
    pub listing_urls: Vec<String>,
    pub keywords: Vec<String>,
}

impl CrawlInput {
    /// Loads seeds from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading input from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse input file: {}", path.display()))
    }

    /// Adds the seeds of `other` after these.
    pub fn merge(mut self, other: CrawlInput) -> Self {
        self.product_urls.extend(other.product_urls);
        self.listing_urls.extend(other.listing_urls);
        self.keywords.extend(other.keywords);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.product_urls.is_empty() && self.listing_urls.is_empty() && self.keywords.is_empty()
    }

    /// Classified requests for every seed.
    ///
    /// Product URLs carry only the price window; listing URLs and keyword
    /// searches also carry the page range.
    pub fn requests(
        &self,
        classifier: &Classifier,
        pagination: PaginationBounds,
        pricing: PriceBounds,
    ) -> Result<Vec<Request>> {
        let mut requests = load_urls(classifier, &self.product_urls, None, Some(pricing));
        requests.extend(load_urls(
            classifier,
            &self.listing_urls,
            Some(pagination),
            Some(pricing),
        ));
        requests.extend(load_keywords(classifier, &self.keywords, pagination, pricing)?);

        info!(
            "Loaded {} seed requests ({} product URLs, {} listing URLs, {} keywords)",
            requests.len(),
            self.product_urls.len(),
            self.listing_urls.len(),
            self.keywords.len()
        );
        Ok(requests)
    }
}

/// One classified request per URL.
pub fn load_urls(
    classifier: &Classifier,
    urls: &[String],
    pagination: Option<PaginationBounds>,
    pricing: Option<PriceBounds>,
) -> Vec<Request> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(|url| {
            classifier.classify(RequestParams::new(url).pagination(pagination).pricing(pricing))
        })
        .collect()
}

/// One search listing request per keyword.
pub fn load_keywords(
    classifier: &Classifier,
    keywords: &[String],
    pagination: PaginationBounds,
    pricing: PriceBounds,
) -> Result<Vec<Request>> {
    keywords
        .iter()
        .map(|kw| kw.trim())
        .filter(|kw| !kw.is_empty())
        .map(|kw| {
            let url = classifier.keyword_url(kw)?;
            Ok(classifier.classify(
                RequestParams::new(url).pagination(Some(pagination)).pricing(Some(pricing)),
            ))
        })
        .collect()
}
