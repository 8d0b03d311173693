//! walmart-crawler - Walmart catalog crawler
//!
//! Crawls listing and product pages into a product dataset, then follows each
//! product's review pages into a second dataset with the full review thread.

pub mod commands;
pub mod config;
pub mod crawl;
pub mod error;
pub mod filters;
pub mod format;
pub mod walmart;

pub use config::Config;
pub use crawl::{Label, PaginationBounds, PriceBounds, Request};
pub use error::{CrawlError, CrawlResult};
pub use walmart::{ProductRecord, Review, ReviewModel};
