//! Per-label request handling.

use crate::config::Config;
use crate::crawl::classifier::Classifier;
use crate::crawl::guard;
use crate::crawl::planner::ListingPlanner;
use crate::crawl::request::{Label, Request};
use crate::crawl::reviews::{ReviewContext, ReviewEngine, ReviewStep};
use crate::error::{CrawlError, CrawlResult};
use crate::filters::{Filter, PriceFilter};
use crate::walmart::{Page, Parser, ProductRecord};
use anyhow::Result;
use tracing::{debug, info};

/// Side effects a handled request asks the runner to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Enqueue(Request),
    /// Handled before anything already pending.
    EnqueueForefront(Request),
    /// Append to the base product dataset.
    PushProduct(Box<ProductRecord>),
    /// Append to the reviews dataset.
    PushReview(Box<ProductRecord>),
}

/// Dispatches fetched pages to the handler for their label.
#[derive(Debug, Clone)]
pub struct Router {
    parser: Parser,
    planner: ListingPlanner,
    reviews: ReviewEngine,
}

impl Router {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            parser: Parser::new(config.base_url.clone()),
            planner: ListingPlanner::new(Classifier::new(config)?),
            reviews: ReviewEngine::new(config)?,
        })
    }

    /// Handles a fetched page.
    ///
    /// A page served as a bot challenge fails with [`CrawlError::Blocked`]
    /// before any label-specific work.
    pub fn handle(&self, request: &Request, page: &Page) -> CrawlResult<Vec<Action>> {
        if request.label == Label::Unclassified {
            return Err(CrawlError::Unclassified { url: request.url.clone() });
        }

        info!(label = %request.label, url = %request.url, "Handling");

        if self.parser.is_blocked(&page.loaded_url, &page.html) {
            return Err(CrawlError::Blocked { url: request.url.clone() });
        }

        match request.label {
            Label::Listing => self.handle_listing(request, page),
            Label::Detail => self.handle_detail(request, page),
            Label::Review => self.handle_review(request, page),
            Label::Unclassified => Err(CrawlError::Unclassified { url: request.url.clone() }),
        }
    }

    fn handle_listing(&self, request: &Request, page: &Page) -> CrawlResult<Vec<Action>> {
        guard::check_pricing(request.user_data.pricing.as_ref())?;

        let listing = self.parser.parse_listing(&request.url, &page.html)?;
        let requests = self.planner.expand(request, &listing)?;
        Ok(requests.into_iter().map(Action::Enqueue).collect())
    }

    fn handle_detail(&self, request: &Request, page: &Page) -> CrawlResult<Vec<Action>> {
        let product = self.parser.parse_product(&request.url, &page.html)?;

        let filter = PriceFilter::from_bounds(request.user_data.pricing);
        if !filter.matches(&product) {
            debug!("Not exporting {} ({})", request.url, filter.description());
            return Ok(Vec::new());
        }

        Ok(vec![Action::PushProduct(Box::new(product))])
    }

    fn handle_review(&self, request: &Request, page: &Page) -> CrawlResult<Vec<Action>> {
        let context = ReviewContext::from_request(request)?;
        let batch = self.parser.parse_reviews(&request.url, &page.html, context.page_number)?;

        match self.reviews.advance(context, batch)? {
            ReviewStep::Continue(next) => Ok(vec![Action::EnqueueForefront(next)]),
            ReviewStep::Complete(product) => Ok(vec![Action::PushReview(product)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::request::{PaginationBounds, PriceBounds, RequestParams};

    const LISTING: &str = include_str!("../../tests/fixtures/listing.html");
    const PRODUCT: &str = include_str!("../../tests/fixtures/product.html");
    const REVIEWS_PAGE_1: &str = include_str!("../../tests/fixtures/reviews_page1.html");
    const REVIEWS_PAGE_2: &str = include_str!("../../tests/fixtures/reviews_page2.html");
    const BLOCKED: &str = include_str!("../../tests/fixtures/blocked.html");

    fn router() -> Router {
        Router::new(&Config::default()).unwrap()
    }

    fn classify(params: RequestParams) -> Request {
        Classifier::new(&Config::default()).unwrap().classify(params)
    }

    fn page(url: &str, html: &str) -> Page {
        Page { loaded_url: url.to_string(), html: html.to_string() }
    }

    fn seeded_review_request() -> Request {
        let product = router().parser.parse_product("https://www.walmart.com/ip/111", PRODUCT);
        ReviewEngine::new(&Config::default()).unwrap().seed(&product.unwrap()).unwrap()
    }

    #[test]
    fn test_listing_with_item_urls() {
        let request = classify(
            RequestParams::new("https://www.walmart.com/browse/home/4044?page=1")
                .pricing(Some(PriceBounds::new(0.0, 0.0))),
        );
        let actions = router().handle(&request, &page(&request.url, LISTING)).unwrap();

        let urls: Vec<_> = actions
            .iter()
            .map(|a| match a {
                Action::Enqueue(r) => {
                    assert_eq!(r.label, Label::Detail);
                    r.url.as_str()
                }
                other => panic!("unexpected action {:?}", other),
            })
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://www.walmart.com/ip/Electric-Kettle-1-7L/111",
                "https://www.walmart.com/ip/2-Slice-Toaster/222",
            ]
        );
    }

    #[test]
    fn test_listing_all_pages() {
        let request = classify(
            RequestParams::new("https://www.walmart.com/search?q=kettle")
                .pagination(Some(PaginationBounds::new(0, 0))),
        );
        let actions = router().handle(&request, &page(&request.url, LISTING)).unwrap();

        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[1], Action::Enqueue(r)
            if r.url == "https://www.walmart.com/search?q=kettle&page=2"
                && r.label == Label::Listing));
    }

    #[test]
    fn test_listing_invalid_pricing() {
        let request = classify(
            RequestParams::new("https://www.walmart.com/browse/home/4044")
                .pagination(Some(PaginationBounds::new(0, 0)))
                .pricing(Some(PriceBounds::new(30.0, 10.0))),
        );
        let err = router().handle(&request, &page(&request.url, LISTING)).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidPriceBounds { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_listing_invalid_pricing_checked_before_parsing() {
        let request = classify(
            RequestParams::new("https://www.walmart.com/browse/home/4044")
                .pricing(Some(PriceBounds::new(50.0, 10.0))),
        );
        let err =
            router().handle(&request, &page(&request.url, "<html>no data</html>")).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidPriceBounds { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_detail_exported() {
        let request = classify(RequestParams::new("https://www.walmart.com/ip/Kettle/111"));
        let actions = router().handle(&request, &page(&request.url, PRODUCT)).unwrap();

        let [Action::PushProduct(product)] = actions.as_slice() else {
            panic!("expected a single product, got {:?}", actions);
        };
        assert_eq!(product.url, "https://www.walmart.com/ip/Kettle/111");
        assert_eq!(product.sku(), Some("111"));
        assert_eq!(product.sale_price(), Some(19.97));
        assert_eq!(product.reviews_model.pages_count, crate::walmart::UNKNOWN_COUNT);
    }

    #[test]
    fn test_detail_outside_price_window_not_exported() {
        let request = classify(
            RequestParams::new("https://www.walmart.com/ip/Kettle/111")
                .pricing(Some(PriceBounds::new(50.0, 100.0))),
        );
        let actions = router().handle(&request, &page(&request.url, PRODUCT)).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_review_continues_then_completes() {
        let router = router();
        let first = seeded_review_request();

        let actions = router.handle(&first, &page(&first.url, REVIEWS_PAGE_1)).unwrap();
        let [Action::EnqueueForefront(second)] = actions.as_slice() else {
            panic!("expected a continuation, got {:?}", actions);
        };
        assert_eq!(second.url, "https://www.walmart.com/reviews/product/111?page=2");

        let actions = router.handle(second, &page(&second.url, REVIEWS_PAGE_2)).unwrap();
        let [Action::PushReview(product)] = actions.as_slice() else {
            panic!("expected a finished record, got {:?}", actions);
        };

        let ids: Vec<_> = product.reviews_model.reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert_eq!(product.reviews_model.pages_count, 2);
        assert!(product.reviews_model.reviews[0].is_verified_purchase);
        assert!(product.reviews_model.reviews[1].is_walmart_associate);
        assert!(product.reviews_model.reviews[2].is_incentivized);
    }

    #[test]
    fn test_review_without_context() {
        let request = classify(RequestParams::new(
            "https://www.walmart.com/reviews/product/111?page=1",
        ));
        let err = router().handle(&request, &page(&request.url, REVIEWS_PAGE_1)).unwrap_err();
        assert!(matches!(err, CrawlError::MissingReviewContext { .. }));
    }

    #[test]
    fn test_blocked_by_loaded_url() {
        let request = classify(RequestParams::new("https://www.walmart.com/ip/Kettle/111"));
        let loaded = "https://www.walmart.com/blocked?url=L2lwLzExMQ==";
        let err = router().handle(&request, &page(loaded, PRODUCT)).unwrap_err();

        assert!(matches!(err, CrawlError::Blocked { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_blocked_by_challenge_page() {
        let request = seeded_review_request();
        let err = router().handle(&request, &page(&request.url, BLOCKED)).unwrap_err();
        assert!(matches!(err, CrawlError::Blocked { .. }));
    }

    #[test]
    fn test_unclassified_dropped() {
        let request = classify(RequestParams::new("https://www.walmart.com/cart"));
        let err = router().handle(&request, &page(&request.url, PRODUCT)).unwrap_err();
        assert!(matches!(err, CrawlError::Unclassified { .. }));
        assert!(!err.is_retryable());
    }
}
