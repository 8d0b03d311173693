//! Price window filter.

use super::Filter;
use crate::crawl::request::PriceBounds;
use crate::walmart::ProductRecord;

/// Filters records by sale price.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceFilter {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceFilter {
    /// Creates a new price filter with optional min/max bounds.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Filter for a request's price window. A zero bound is unset.
    pub fn from_bounds(bounds: Option<PriceBounds>) -> Self {
        let Some(bounds) = bounds else {
            return Self::default();
        };
        let positive = |v: f64| (v > 0.0).then_some(v);
        Self::new(positive(bounds.min_price), positive(bounds.max_price))
    }
}

impl Filter for PriceFilter {
    fn matches(&self, product: &ProductRecord) -> bool {
        // Records without a price are exported
        let Some(price) = product.sale_price() else {
            return true;
        };

        if self.min.is_some_and(|min| price < min) {
            return false;
        }

        if self.max.is_some_and(|max| price > max) {
            return false;
        }

        true
    }

    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("Price: ${:.2} - ${:.2}", min, max),
            (Some(min), None) => format!("Price: >= ${:.2}", min),
            (None, Some(max)) => format!("Price: <= ${:.2}", max),
            (None, None) => "Price: any".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_product(price: Option<f64>) -> ProductRecord {
        let mut product = ProductRecord::default();
        product.pricing.sale_price = price.unwrap_or_default();
        product
    }

    #[test]
    fn test_price_range() {
        let filter = PriceFilter::new(Some(10.0), Some(50.0));

        assert!(!filter.matches(&make_product(Some(5.0))));
        assert!(filter.matches(&make_product(Some(10.0))));
        assert!(filter.matches(&make_product(Some(30.0))));
        assert!(filter.matches(&make_product(Some(50.0))));
        assert!(!filter.matches(&make_product(Some(50.01))));
    }

    #[test]
    fn test_no_price_passes() {
        let filter = PriceFilter::new(Some(10.0), Some(50.0));
        assert!(filter.matches(&make_product(None)));
        assert!(filter.matches(&make_product(Some(0.0))));
    }

    #[test]
    fn test_from_bounds_zero_is_unbounded() {
        let filter = PriceFilter::from_bounds(Some(PriceBounds::new(0.0, 0.0)));
        assert_eq!(filter, PriceFilter::new(None, None));
        assert!(filter.matches(&make_product(Some(1_000_000.0))));

        let filter = PriceFilter::from_bounds(Some(PriceBounds::new(20.0, 0.0)));
        assert!(!filter.matches(&make_product(Some(10.0))));
        assert!(filter.matches(&make_product(Some(500.0))));
    }

    #[test]
    fn test_from_bounds_absent() {
        assert_eq!(PriceFilter::from_bounds(None), PriceFilter::default());
    }

    #[test]
    fn test_description() {
        assert_eq!(PriceFilter::new(Some(10.0), Some(50.0)).description(), "Price: $10.00 - $50.00");
        assert_eq!(PriceFilter::new(Some(20.0), None).description(), "Price: >= $20.00");
        assert_eq!(PriceFilter::new(None, Some(50.0)).description(), "Price: <= $50.00");
        assert_eq!(PriceFilter::default().description(), "Price: any");
    }
}
