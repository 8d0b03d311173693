//! Data models for Walmart products and their review threads.

use serde::{Deserialize, Serialize};

/// Marker for a counter that has not been discovered yet.
pub const UNKNOWN_COUNT: i64 = -1;

/// A product exported from a detail page, optionally carrying its reviews.
///
/// Field names serialize in camelCase so datasets written by earlier runs
/// can seed review chains unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    #[serde(rename = "URL")]
    pub url: String,
    pub id_codes: IdCodes,
    pub seller: Seller,
    pub title: String,
    pub media: Media,
    pub pricing: Pricing,
    pub is_available: bool,
    pub is_gift_eligible: bool,
    pub is_used: bool,
    pub rating: ProductRating,
    pub order_limits: OrderLimits,
    pub category: Category,
    pub info: Informational,
    pub variants: Vec<Variant>,
    pub reviews_model: ReviewModel,
}

impl ProductRecord {
    /// Returns the SKU if present and non-blank.
    pub fn sku(&self) -> Option<&str> {
        self.id_codes.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Returns the sale price, treating zero as "not listed".
    pub fn sale_price(&self) -> Option<f64> {
        (self.pricing.sale_price > 0.0).then_some(self.pricing.sale_price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdCodes {
    #[serde(rename = "SKU", default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(rename = "UPC", default, skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seller {
    pub brand: Option<String>,
    #[serde(rename = "brandURL")]
    pub brand_url: Option<String>,
    pub seller: Option<String>,
    #[serde(rename = "sellerURL")]
    pub seller_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    pub main: Option<String>,
    pub gallery: Vec<String>,
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    pub title: Option<String>,
    pub url: String,
}

/// Sale and list price of a product or variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pricing {
    pub sale_price: f64,
    pub full_price: Option<f64>,
    pub currency_symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribute {
    pub attribute: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRating {
    pub item_reviews: Option<u64>,
    pub item_rating: Option<f64>,
    pub seller_reviews: Option<u64>,
    pub seller_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLimits {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub full_path: Option<String>,
    pub path_parts: Vec<CategoryPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPart {
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Informational {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub specifications: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Variant {
    pub is_current_variant: bool,
    pub url: String,
    #[serde(rename = "SKU")]
    pub sku: Option<String>,
    pub is_available: bool,
    pub pricing: Pricing,
    pub options: Vec<Attribute>,
}

/// Running review state for one product.
///
/// Counters start at [`UNKNOWN_COUNT`] and take the values reported by the
/// most recently merged review page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewModel {
    #[serde(default = "unknown_count")]
    pub pages_count: i64,
    #[serde(default = "unknown_count")]
    pub rating_count: i64,
    #[serde(default = "unknown_count")]
    pub review_count: i64,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

fn unknown_count() -> i64 {
    UNKNOWN_COUNT
}

impl Default for ReviewModel {
    fn default() -> Self {
        Self {
            pages_count: UNKNOWN_COUNT,
            rating_count: UNKNOWN_COUNT,
            review_count: UNKNOWN_COUNT,
            reviews: Vec::new(),
        }
    }
}

impl ReviewModel {
    /// Folds one page into the accumulated model.
    ///
    /// Reviews already collected stay first and in order; the page's batch is
    /// appended after them. Counters are overwritten by the page.
    pub fn merge(mut self, page: ReviewModel) -> ReviewModel {
        self.reviews.extend(page.reviews);
        ReviewModel {
            pages_count: page.pages_count,
            rating_count: page.rating_count,
            review_count: page.review_count,
            reviews: self.reviews,
        }
    }

    /// Returns true once the page count has been discovered.
    pub fn is_resolved(&self) -> bool {
        self.pages_count != UNKNOWN_COUNT
    }
}

/// A single customer review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: String,
    pub author: Author,
    pub review_submission_time: Option<String>,
    pub rating: Option<f64>,
    pub url: String,
    pub is_verified_purchase: bool,
    pub review_title: Option<String>,
    pub review_text: Option<String>,
    pub positive_feedback: u64,
    pub negative_feedback: u64,
    pub seller_name: Option<String>,
    pub features: Option<Vec<ReviewFeature>>,
    pub fulfilled_by: Option<String>,
    pub is_incentivized: bool,
    pub client_responses: Option<Vec<ClientResponse>>,
    pub is_walmart_associate: bool,
    pub page_number: u32,
    pub syndication_source: Option<SyndicationSource>,
    pub media: Option<Vec<ReviewMedia>>,
    pub status: Option<String>,
    pub is_international: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub author_id: Option<String>,
    pub user_nickname: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFeature {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientResponse {
    pub date: Option<String>,
    pub department: Option<String>,
    pub logo_image: Option<String>,
    pub name: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyndicationSource {
    pub content_link: Option<String>,
    pub logo_image_url: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewMedia {
    pub caption: Option<String>,
    pub id: Option<String>,
    pub media_type: Option<String>,
    pub normal_url: Option<String>,
    pub rating: Option<f64>,
    pub review_id: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// What a listing page exposes to the pagination planner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    /// Total number of pages in this listing group.
    pub total_pages: u32,
    /// Absolute URLs of the items shown on this page.
    pub item_urls: Vec<String>,
}
