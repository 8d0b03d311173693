//! Show command: prints a dataset in the configured output format.

use crate::config::Config;
use crate::crawl::Dataset;
use crate::format::Formatter;
use crate::walmart::ProductRecord;
use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

/// Which dataset to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatasetKind {
    /// Records from the base crawl.
    #[default]
    Products,
    /// Records with their review threads.
    Reviews,
}

impl std::str::FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "products" | "base" => Ok(DatasetKind::Products),
            "reviews" => Ok(DatasetKind::Reviews),
            _ => Err(format!("Unknown dataset: {}. Use: products, reviews", s)),
        }
    }
}

/// Formats stored records.
pub struct ShowCommand {
    config: Config,
}

impl ShowCommand {
    /// Creates a new show command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn path(&self, kind: DatasetKind) -> PathBuf {
        match kind {
            DatasetKind::Products => self.config.products_path(),
            DatasetKind::Reviews => self.config.reviews_path(),
        }
    }

    /// Formats every record, or only the one with `sku` if given.
    pub fn execute(&self, kind: DatasetKind, sku: Option<&str>) -> Result<String> {
        let path = self.path(kind);
        let mut records: Vec<ProductRecord> = Dataset::items(&path)?;
        debug!("Read {} records from {}", records.len(), path.display());

        let formatter = Formatter::new(self.config.format);

        let Some(sku) = sku else {
            return Ok(formatter.format_records(&records));
        };

        // Later records win, as a re-run appends rather than replaces
        records.retain(|r| r.sku() == Some(sku));
        match records.pop() {
            Some(record) => Ok(formatter.format_record(&record)),
            None => anyhow::bail!("No record with SKU {} in {}", sku, path.display()),
        }
    }
}
