//! Filters applied to product records before they are exported.

pub mod price;

use crate::walmart::ProductRecord;

pub use price::PriceFilter;

/// Trait for filtering product records.
pub trait Filter: Send + Sync {
    /// Returns true if the record passes the filter.
    fn matches(&self, product: &ProductRecord) -> bool;

    /// Returns a description of this filter.
    fn description(&self) -> String;
}
