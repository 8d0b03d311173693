//! Crawl orchestration: classification, planning, review chains and the runner.

pub mod classifier;
pub mod dataset;
pub mod guard;
pub mod inputs;
pub mod planner;
pub mod queue;
pub mod request;
pub mod reviews;
pub mod router;
pub mod runner;

pub use classifier::Classifier;
pub use dataset::{Dataset, Datasets};
pub use inputs::CrawlInput;
pub use planner::{ListingPlan, ListingPlanner};
pub use queue::RequestQueue;
pub use request::{Label, PaginationBounds, PriceBounds, Request, RequestParams, UserData};
pub use reviews::{ReviewContext, ReviewEngine, ReviewStep, SeededChains};
pub use router::{Action, Router};
pub use runner::{CrawlStats, Crawler};
