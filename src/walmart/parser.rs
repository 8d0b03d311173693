//! Parser for the page state Walmart embeds in listing, product and review pages.

use crate::error::{CrawlError, CrawlResult};
use crate::walmart::models::{
    Attribute, Author, Category, CategoryPart, IdCodes, Informational, ListingPage, Media,
    OrderLimits, Pricing, ProductRating, ProductRecord, Review, ReviewModel, Seller, Variant, Video,
    UNKNOWN_COUNT,
};
use crate::walmart::selectors::{self, listing, product, reviews};
use scraper::Html;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

/// Number of reviews Walmart shows per review page.
pub const REVIEWS_PER_PAGE: i64 = 10;

/// Parser for Walmart HTML pages.
#[derive(Debug, Clone)]
pub struct Parser {
    base_url: String,
}

impl Parser {
    /// Creates a parser resolving relative links against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    /// Returns true if the page is a bot-challenge page rather than content.
    pub fn is_blocked(&self, loaded_url: &str, html: &str) -> bool {
        if loaded_url.contains(selectors::blocked::URL_MARKER) {
            return true;
        }
        let document = Html::parse_document(html);
        document.select(&selectors::blocked::CHALLENGE).next().is_some()
    }

    /// Extracts the `__NEXT_DATA__` JSON from a page.
    pub fn next_data(&self, url: &str, html: &str) -> CrawlResult<Value> {
        let document = Html::parse_document(html);
        let script = document
            .select(&selectors::NEXT_DATA)
            .next()
            .ok_or_else(|| parse_error(url, "page has no __NEXT_DATA__ script"))?;

        serde_json::from_str(&script.inner_html())
            .map_err(|e| parse_error(url, format!("invalid __NEXT_DATA__ JSON: {}", e)))
    }

    /// Parses a browse, search or brand page.
    ///
    /// A page without pagination info counts as a single page.
    pub fn parse_listing(&self, url: &str, html: &str) -> CrawlResult<ListingPage> {
        let data = self.next_data(url, html)?;
        let result = data
            .pointer(listing::SEARCH_RESULT)
            .ok_or_else(|| parse_error(url, "listing page has no search result"))?;

        let total_pages = result
            .pointer(listing::MAX_PAGE)
            .and_then(Value::as_u64)
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(1);

        let item_urls: Vec<String> = result
            .pointer(listing::ITEM_STACKS)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|stack| stack.get("items").and_then(Value::as_array))
            .flatten()
            .filter_map(|item| item.get("canonicalUrl").and_then(Value::as_str))
            .filter_map(|href| self.absolute_url(href))
            .collect();

        debug!("Parsed listing {} ({} pages, {} items)", url, total_pages, item_urls.len());

        Ok(ListingPage { total_pages, item_urls })
    }

    /// Parses a product detail page into a record with an empty review model.
    pub fn parse_product(&self, url: &str, html: &str) -> CrawlResult<ProductRecord> {
        let data = self.next_data(url, html)?;
        let item = data
            .pointer(product::PRODUCT)
            .ok_or_else(|| parse_error(url, "detail page has no product data"))?;
        let idml = data.pointer(product::IDML);

        let record = ProductRecord {
            url: url.to_string(),
            id_codes: IdCodes { sku: string_at(item, "/usItemId"), upc: string_at(item, "/upc") },
            seller: Seller {
                brand: string_at(item, "/brand"),
                brand_url: string_at(item, "/brandUrl").and_then(|u| self.absolute_url(&u)),
                seller: string_at(item, "/sellerDisplayName")
                    .or_else(|| string_at(item, "/sellerName")),
                seller_url: string_at(item, "/sellerId")
                    .and_then(|id| self.absolute_url(&format!("/seller/{}", id))),
            },
            title: string_at(item, "/name").unwrap_or_default(),
            media: self.parse_media(item),
            pricing: parse_pricing(item),
            is_available: string_at(item, "/availabilityStatus")
                .is_some_and(|s| s == "IN_STOCK"),
            is_gift_eligible: item
                .pointer("/giftingEligibility")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            is_used: string_at(item, "/conditionType")
                .is_some_and(|c| !c.eq_ignore_ascii_case("new")),
            rating: ProductRating {
                item_reviews: item.pointer("/numberOfReviews").and_then(Value::as_u64),
                item_rating: item.pointer("/averageRating").and_then(Value::as_f64),
                seller_reviews: item.pointer("/sellerReviewCount").and_then(Value::as_u64),
                seller_rating: item.pointer("/sellerAverageRating").and_then(Value::as_f64),
            },
            order_limits: OrderLimits {
                min: item.pointer("/orderMinLimit").and_then(Value::as_u64).map(|n| n as u32),
                max: item.pointer("/orderLimit").and_then(Value::as_u64).map(|n| n as u32),
            },
            category: self.parse_category(item),
            info: idml.map(parse_informational).unwrap_or_default(),
            variants: self.parse_variants(item),
            reviews_model: ReviewModel::default(),
        };

        trace!("Parsed product {:?}: {}", record.id_codes.sku, record.title);
        Ok(record)
    }

    /// Parses one page of a product's reviews into a page-scoped model.
    ///
    /// `pages_count` is derived from the total review count. When the total is
    /// missing the count stays unknown, unless the page is empty, in which case
    /// the thread is treated as exhausted at this page.
    pub fn parse_reviews(
        &self,
        url: &str,
        html: &str,
        page_number: u32,
    ) -> CrawlResult<ReviewModel> {
        let data = self.next_data(url, html)?;
        let block = data
            .pointer(reviews::REVIEWS)
            .ok_or_else(|| parse_error(url, "review page has no reviews data"))?;

        let reviews: Vec<Review> = block
            .get("customerReviews")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|raw| parse_review(raw, url, page_number))
            .collect();

        let total = block.pointer("/pagination/total").and_then(Value::as_i64);
        let pages_count = match total {
            Some(total) => (total + REVIEWS_PER_PAGE - 1).div_euclid(REVIEWS_PER_PAGE),
            None if reviews.is_empty() => {
                warn!("Review page {} has no total and no reviews, ending thread", url);
                i64::from(page_number)
            }
            None => UNKNOWN_COUNT,
        };

        debug!("# of reviews found: {} on page {}", reviews.len(), page_number);

        Ok(ReviewModel {
            pages_count,
            rating_count: block
                .get("totalReviewCount")
                .and_then(Value::as_i64)
                .unwrap_or(UNKNOWN_COUNT),
            review_count: total.unwrap_or(UNKNOWN_COUNT),
            reviews,
        })
    }

    /// Resolves a possibly relative link against the base URL.
    fn absolute_url(&self, href: &str) -> Option<String> {
        if href.starts_with("http") {
            return Some(href.to_string());
        }
        let base = Url::parse(&self.base_url).ok()?;
        base.join(href).ok().map(String::from)
    }

    fn parse_media(&self, item: &Value) -> Media {
        let gallery = item
            .pointer("/imageInfo/allImages")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|img| string_at(img, "/url"))
            .collect();

        let videos = item
            .get("videos")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|v| {
                let url = string_at(v, "/versions/large").or_else(|| string_at(v, "/url"))?;
                Some(Video { title: string_at(v, "/title"), url })
            })
            .collect();

        Media { main: string_at(item, "/imageInfo/thumbnailUrl"), gallery, videos }
    }

    fn parse_category(&self, item: &Value) -> Category {
        let path_parts: Vec<CategoryPart> = item
            .pointer("/category/path")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|part| {
                Some(CategoryPart {
                    name: string_at(part, "/name")?,
                    url: string_at(part, "/url").and_then(|u| self.absolute_url(&u)),
                })
            })
            .collect();

        let full_path = (!path_parts.is_empty()).then(|| {
            path_parts.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(" / ")
        });

        Category { full_path, path_parts }
    }

    fn parse_variants(&self, item: &Value) -> Vec<Variant> {
        let current = string_at(item, "/usItemId");

        item.get("variantsMap")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(_, v)| {
                let sku = string_at(v, "/usItemId");
                Variant {
                    is_current_variant: sku.is_some() && sku == current,
                    url: string_at(v, "/canonicalUrl")
                        .or_else(|| string_at(v, "/productUrl"))
                        .and_then(|u| self.absolute_url(&u))
                        .unwrap_or_default(),
                    sku,
                    is_available: string_at(v, "/availabilityStatus")
                        .is_some_and(|s| s == "IN_STOCK"),
                    pricing: parse_pricing(v),
                    options: v
                        .get("variants")
                        .and_then(Value::as_array)
                        .into_iter()
                        .flatten()
                        .filter_map(Value::as_str)
                        .filter_map(|option| {
                            let (attribute, value) = option.split_once('-')?;
                            Some(Attribute {
                                attribute: attribute.to_string(),
                                value: value.to_string(),
                            })
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

fn parse_error(url: &str, message: impl Into<String>) -> CrawlError {
    CrawlError::Parse { url: url.to_string(), message: message.into() }
}

/// Reads a string, or a number rendered as a string, at a JSON pointer.
fn string_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserializes an optional sub-object, ignoring shapes we don't recognise.
fn typed_at<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    value
        .get(key)
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn parse_pricing(item: &Value) -> Pricing {
    Pricing {
        sale_price: item
            .pointer("/priceInfo/currentPrice/price")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        full_price: item.pointer("/priceInfo/wasPrice/price").and_then(Value::as_f64),
        currency_symbol: string_at(item, "/priceInfo/currentPrice/currencyUnitSymbol")
            .or_else(|| string_at(item, "/priceInfo/currentPrice/currencyUnit")),
    }
}

fn parse_informational(idml: &Value) -> Informational {
    Informational {
        short_description: string_at(idml, "/shortDescription"),
        long_description: string_at(idml, "/longDescription"),
        specifications: idml
            .get("specifications")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|spec| {
                Some(Attribute {
                    attribute: string_at(spec, "/name")?,
                    value: string_at(spec, "/value")?,
                })
            })
            .collect(),
    }
}

/// Returns true if any badge carries `id` at the given pointer.
fn has_badge(badges: Option<&Vec<Value>>, pointer: &str, id: &str) -> bool {
    badges
        .into_iter()
        .flatten()
        .any(|badge| badge.pointer(pointer).and_then(Value::as_str) == Some(id))
}

fn parse_review(raw: &Value, url: &str, page_number: u32) -> Review {
    let badges = raw.get("badges").and_then(Value::as_array);

    Review {
        id: string_at(raw, "/reviewId").unwrap_or_default(),
        author: Author {
            author_id: string_at(raw, "/authorId"),
            user_nickname: string_at(raw, "/userNickname"),
        },
        review_submission_time: string_at(raw, "/reviewSubmissionTime"),
        rating: raw.get("rating").and_then(|r| {
            r.as_f64().or_else(|| r.as_str().and_then(|s| s.parse().ok()))
        }),
        url: url.to_string(),
        is_verified_purchase: has_badge(badges, "/glassBadge/id", "VerifiedPurchaser"),
        review_title: string_at(raw, "/reviewTitle"),
        review_text: string_at(raw, "/reviewText"),
        positive_feedback: raw.get("positiveFeedback").and_then(Value::as_u64).unwrap_or(0),
        negative_feedback: raw.get("negativeFeedback").and_then(Value::as_u64).unwrap_or(0),
        seller_name: string_at(raw, "/sellerName"),
        features: typed_at(raw, "features"),
        fulfilled_by: string_at(raw, "/fulfilledBy"),
        is_incentivized: has_badge(badges, "/id", "PrizeIncentive"),
        client_responses: typed_at(raw, "clientResponses"),
        is_walmart_associate: has_badge(badges, "/id", "Staff"),
        page_number,
        syndication_source: typed_at(raw, "syndicationSource"),
        media: typed_at(raw, "media"),
        status: string_at(raw, "/status"),
        is_international: has_badge(badges, "/glassBadge/id", "InternationalReview"),
    }
}
