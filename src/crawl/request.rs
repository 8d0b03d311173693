//! Requests flowing through the crawl queue.

use crate::walmart::models::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handler a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Listing,
    Detail,
    Review,
    Unclassified,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Listing => write!(f, "LISTING"),
            Label::Detail => write!(f, "DETAIL"),
            Label::Review => write!(f, "REVIEW"),
            Label::Unclassified => write!(f, "UNCLASSIFIED"),
        }
    }
}

/// Inclusive listing page range. `(0, 0)` asks for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationBounds {
    pub start_page_number: u32,
    pub final_page_number: u32,
}

impl PaginationBounds {
    pub fn new(start_page_number: u32, final_page_number: u32) -> Self {
        Self { start_page_number, final_page_number }
    }

    /// Returns true for the `(0, 0)` "all pages" sentinel.
    pub fn is_all_pages(&self) -> bool {
        self.start_page_number == 0 && self.final_page_number == 0
    }
}

/// Price window for exported products.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBounds {
    pub min_price: f64,
    pub max_price: f64,
}

impl PriceBounds {
    pub fn new(min_price: f64, max_price: f64) -> Self {
        Self { min_price, max_price }
    }
}

/// Context carried by a request to its handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub pagination: Option<PaginationBounds>,
    pub pricing: Option<PriceBounds>,
    pub sku: Option<String>,
    pub page_number: Option<u32>,
    /// Product snapshot carried through a review chain.
    pub product: Option<Box<ProductRecord>>,
}

/// A unit of work: fetch `url`, then hand the page to the handler for `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub url: String,
    pub label: Label,
    pub user_data: UserData,
    /// Failed attempts so far. Owned by the runner.
    #[serde(default)]
    pub retry_count: u32,
}

/// Inputs to [`Classifier::classify`](super::classifier::Classifier::classify).
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub url: String,
    pub label: Option<Label>,
    pub pagination: Option<PaginationBounds>,
    pub pricing: Option<PriceBounds>,
    pub sku: Option<String>,
    pub page_number: Option<u32>,
    pub product: Option<ProductRecord>,
}

impl RequestParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    pub fn label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn pagination(mut self, pagination: Option<PaginationBounds>) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn pricing(mut self, pricing: Option<PriceBounds>) -> Self {
        self.pricing = pricing;
        self
    }

    /// Attaches the review chain context: SKU, page number and product snapshot.
    pub fn review(
        mut self,
        sku: impl Into<String>,
        page_number: u32,
        product: ProductRecord,
    ) -> Self {
        self.sku = Some(sku.into());
        self.page_number = Some(page_number);
        self.product = Some(product);
        self
    }
}
