//! Listing pagination planning.
//!
//! A listing request either stands for a single page, whose items are
//! enqueued, or for a page range of its listing group, whose pages are
//! enqueued as single-page listing requests. The range is validated against
//! the total page count discovered on the first fetch of the group.

use crate::crawl::classifier::Classifier;
use crate::crawl::guard;
use crate::crawl::request::{Label, PaginationBounds, Request, RequestParams};
use crate::error::{CrawlError, CrawlResult};
use crate::walmart::models::ListingPage;
use tracing::{debug, info};

/// What a listing fetch expands into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPlan {
    /// Enqueue the items found on this page.
    ItemUrls,
    /// Enqueue pages `1..=total_pages`.
    AllPages { total_pages: u32 },
    /// Enqueue pages `start..=last`.
    PageRange { start: u32, last: u32 },
}

impl ListingPlan {
    /// Page numbers to enqueue, in ascending order.
    pub fn pages(&self) -> std::ops::RangeInclusive<u32> {
        match *self {
            ListingPlan::ItemUrls => 1..=0,
            ListingPlan::AllPages { total_pages } => 1..=total_pages,
            ListingPlan::PageRange { start, last } => start..=last,
        }
    }
}

/// Expands listing pages into further requests.
#[derive(Debug, Clone)]
pub struct ListingPlanner {
    classifier: Classifier,
}

impl ListingPlanner {
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// Decides what a listing fetch expands into.
    ///
    /// Page 0 is not a real page, so a range starting at 0 (other than the
    /// `(0, 0)` sentinel) starts at page 1.
    pub fn plan(
        pagination: Option<PaginationBounds>,
        total_pages: u32,
    ) -> CrawlResult<ListingPlan> {
        let Some(bounds) = pagination else {
            return Ok(ListingPlan::ItemUrls);
        };

        if bounds.is_all_pages() {
            return Ok(ListingPlan::AllPages { total_pages });
        }

        let (start, last) = (bounds.start_page_number, bounds.final_page_number);

        if start > last {
            return Err(CrawlError::InvalidPageRange { start, last });
        }

        if last > total_pages {
            return Err(CrawlError::PageRangeExceedsTotal { last, total: total_pages });
        }

        Ok(ListingPlan::PageRange { start: start.max(1), last })
    }

    /// Builds the requests a fetched listing page leads to.
    ///
    /// The price window is validated first; an inverted window rejects the
    /// whole branch before pagination is considered.
    pub fn expand(&self, request: &Request, listing: &ListingPage) -> CrawlResult<Vec<Request>> {
        let pricing = request.user_data.pricing;
        guard::check_pricing(pricing.as_ref())?;

        let plan = Self::plan(request.user_data.pagination, listing.total_pages)?;
        debug!("Listing {} planned as {:?}", request.url, plan);

        let requests = match plan {
            ListingPlan::ItemUrls => listing
                .item_urls
                .iter()
                .map(|url| {
                    self.classifier.classify(RequestParams::new(url.as_str()).pricing(pricing))
                })
                .collect::<Vec<_>>(),
            ListingPlan::AllPages { .. } | ListingPlan::PageRange { .. } => plan
                .pages()
                .map(|page| {
                    let url = self.classifier.page_url(&request.url, page)?;
                    Ok(self
                        .classifier
                        .classify(RequestParams::new(url).label(Label::Listing).pricing(pricing)))
                })
                .collect::<CrawlResult<Vec<_>>>()?,
        };

        info!("Listing {} expanded into {} requests", request.url, requests.len());
        Ok(requests)
    }
}
