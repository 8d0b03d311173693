//! Walmart-specific modules for HTTP client, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{Page, WalmartClient, WalmartFetch};
pub use models::{ListingPage, ProductRecord, Review, ReviewModel, UNKNOWN_COUNT};
pub use parser::Parser;
