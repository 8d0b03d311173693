//! Price window validation run before any listing expansion.

use crate::crawl::request::PriceBounds;
use crate::error::{CrawlError, CrawlResult};

/// Rejects an inverted price window.
///
/// Runs at the start of every listing branch, before pagination is looked at.
/// A request without pricing has nothing to validate.
pub fn check_pricing(pricing: Option<&PriceBounds>) -> CrawlResult<()> {
    match pricing {
        Some(p) if p.max_price < p.min_price => {
            Err(CrawlError::InvalidPriceBounds { min: p.min_price, max: p.max_price })
        }
        _ => Ok(()),
    }
}
