//! CLI command implementations.

pub mod classify;
pub mod crawl;
pub mod reviews;
pub mod show;

pub use classify::ClassifyCommand;
pub use crawl::CrawlCommand;
pub use reviews::ReviewsCommand;
pub use show::{DatasetKind, ShowCommand};
