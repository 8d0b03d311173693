//! Classify command: shows which handler each URL would be routed to.

use crate::config::Config;
use crate::crawl::{Classifier, RequestParams};
use crate::format::Formatter;
use anyhow::Result;

/// Labels URLs without fetching them.
pub struct ClassifyCommand {
    config: Config,
}

impl ClassifyCommand {
    /// Creates a new classify command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn execute(&self, urls: &[String]) -> Result<String> {
        let classifier = Classifier::new(&self.config)?;
        let requests: Vec<_> =
            urls.iter().map(|url| classifier.classify(RequestParams::new(url.as_str()))).collect();

        Ok(Formatter::new(self.config.format).format_requests(&requests))
    }
}
