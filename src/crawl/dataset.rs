//! Append-only JSON-lines datasets.

use crate::config::Config;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A dataset stored as one JSON record per line.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    file: File,
    pushed: usize,
}

impl Dataset {
    /// Opens a dataset for appending, creating it and its directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create dataset directory: {}", dir.display())
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        debug!("Opened dataset {}", path.display());
        Ok(Self { path, file, pushed: 0 })
    }

    /// Appends one record.
    pub fn push<T: Serialize>(&mut self, item: &T) -> Result<()> {
        let mut line = serde_json::to_string(item).context("Failed to serialize record")?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .with_context(|| format!("Failed to write to dataset: {}", self.path.display()))?;
        self.pushed += 1;
        Ok(())
    }

    /// Records appended through this handle.
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record of the dataset at `path`.
    ///
    /// A missing file is an empty dataset. Blank lines are ignored; a line
    /// that does not parse is logged and skipped.
    pub fn items<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

        let mut items = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line =
                line.with_context(|| format!("Failed to read dataset: {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!("Skipping malformed record at {}:{}: {}", path.display(), index + 1, e)
                }
            }
        }
        Ok(items)
    }
}

/// The two datasets a crawl writes to.
#[derive(Debug)]
pub struct Datasets {
    /// Records exported from detail pages.
    pub products: Dataset,
    /// Records with their complete review threads.
    pub reviews: Dataset,
}

impl Datasets {
    /// Opens both datasets under the configured storage directory.
    pub fn open(config: &Config) -> Result<Self> {
        Ok(Self {
            products: Dataset::open(config.products_path())?,
            reviews: Dataset::open(config.reviews_path())?,
        })
    }
}
