//! Integration tests for the page parser using fixture files.

use walmart_crawler::walmart::Parser;
use walmart_crawler::walmart::UNKNOWN_COUNT;

const LISTING_FIXTURE: &str = include_str!("fixtures/listing.html");
const PRODUCT_FIXTURE: &str = include_str!("fixtures/product.html");
const REVIEWS_FIXTURE: &str = include_str!("fixtures/reviews_page1.html");
const BLOCKED_FIXTURE: &str = include_str!("fixtures/blocked.html");

fn parser() -> Parser {
    Parser::new("https://www.walmart.com/")
}

#[test]
fn test_parse_listing() {
    let listing =
        parser().parse_listing("https://www.walmart.com/browse/kitchen", LISTING_FIXTURE).unwrap();

    assert_eq!(listing.total_pages, 2);
    assert_eq!(
        listing.item_urls,
        vec![
            "https://www.walmart.com/ip/Electric-Kettle-1-7L/111",
            "https://www.walmart.com/ip/2-Slice-Toaster/222",
        ]
    );
}

#[test]
fn test_parse_product() {
    let url = "https://www.walmart.com/ip/Electric-Kettle-1-7L/111";
    let product = parser().parse_product(url, PRODUCT_FIXTURE).unwrap();

    assert_eq!(product.url, url);
    assert_eq!(product.sku(), Some("111"));
    assert_eq!(product.id_codes.upc.as_deref(), Some("000111222333"));
    assert_eq!(product.title, "Electric Kettle 1.7L");

    // Check seller
    assert_eq!(product.seller.brand.as_deref(), Some("Mainstays"));
    assert_eq!(
        product.seller.brand_url.as_deref(),
        Some("https://www.walmart.com/brand/mainstays")
    );
    assert_eq!(product.seller.seller.as_deref(), Some("Walmart.com"));

    // Check price
    assert_eq!(product.sale_price(), Some(19.97));
    assert_eq!(product.pricing.full_price, Some(24.97));
    assert_eq!(product.pricing.currency_symbol.as_deref(), Some("$"));

    assert!(product.is_available);
    assert!(product.is_gift_eligible);
    assert!(!product.is_used);
    assert_eq!(product.rating.item_rating, Some(4.4));
    assert_eq!(product.rating.item_reviews, Some(12));
    assert_eq!(product.order_limits.max, Some(12));

    assert_eq!(product.media.gallery.len(), 2);
    assert_eq!(product.category.full_path.as_deref(), Some("Home / Kitchen"));
    assert_eq!(product.info.short_description.as_deref(), Some("Boils water fast."));
    assert_eq!(product.info.specifications.len(), 1);

    // Reviews are collected in a later pass
    assert_eq!(product.reviews_model.pages_count, UNKNOWN_COUNT);
    assert!(product.reviews_model.reviews.is_empty());
}

#[test]
fn test_parse_reviews() {
    let url = "https://www.walmart.com/reviews/product/111?page=1";
    let page = parser().parse_reviews(url, REVIEWS_FIXTURE, 1).unwrap();

    assert_eq!(page.pages_count, 2);
    assert_eq!(page.review_count, 12);
    assert_eq!(page.rating_count, 12);
    assert_eq!(page.reviews.len(), 2);

    let first = &page.reviews[0];
    assert_eq!(first.id, "r1");
    assert_eq!(first.author.user_nickname.as_deref(), Some("Sam"));
    assert_eq!(first.rating, Some(5.0));
    assert_eq!(first.page_number, 1);
    assert!(first.is_verified_purchase);
    assert!(!first.is_walmart_associate);

    assert!(page.reviews[1].is_walmart_associate);
}

#[test]
fn test_blocked_detection() {
    let p = parser();
    assert!(p.is_blocked("https://www.walmart.com/ip/1", BLOCKED_FIXTURE));
    assert!(p.is_blocked("https://www.walmart.com/blocked?url=abc", PRODUCT_FIXTURE));
    assert!(!p.is_blocked("https://www.walmart.com/ip/1", PRODUCT_FIXTURE));
}

#[test]
fn test_blocked_page_has_no_data() {
    assert!(parser().parse_product("https://www.walmart.com/ip/1", BLOCKED_FIXTURE).is_err());
}
