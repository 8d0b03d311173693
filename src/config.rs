//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::crawl::request::{PaginationBounds, PriceBounds};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site root, with trailing slash. Review and search URLs are built on it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// Requests handled at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Attempts after the first for blocked or failed fetches
    #[serde(default = "default_max_request_retries")]
    pub max_request_retries: u32,

    /// Directory holding the product and review datasets
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Output format for `show`
    #[serde(default)]
    pub format: OutputFormat,

    /// First listing page to crawl (0 together with final = all pages)
    #[serde(default)]
    pub start_page_number: u32,

    /// Last listing page to crawl, inclusive
    #[serde(default)]
    pub final_page_number: u32,

    /// Minimum price of exported products
    #[serde(default)]
    pub min_price: f64,

    /// Maximum price of exported products. 0 leaves the window open only
    /// while `min_price` is 0 too.
    #[serde(default)]
    pub max_price: f64,
}

fn default_base_url() -> String {
    "https://www.walmart.com/".to_string()
}

fn default_delay_ms() -> u64 {
    600
}

fn default_delay_jitter_ms() -> u64 {
    1200
}

fn default_navigation_timeout_secs() -> u64 {
    90
}

fn default_max_concurrency() -> usize {
    5
}

fn default_max_request_retries() -> u32 {
    20
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            max_request_retries: default_max_request_retries(),
            storage_dir: default_storage_dir(),
            format: OutputFormat::Table,
            start_page_number: 0,
            final_page_number: 0,
            min_price: 0.0,
            max_price: 0.0,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config.normalized())
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("walmart-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("WM_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("WM_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("WM_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(dir) = std::env::var("WM_STORAGE_DIR") {
            self.storage_dir = PathBuf::from(dir);
        }

        self.normalized()
    }

    /// Ensures the base URL ends with a slash so paths can be appended.
    pub fn normalized(mut self) -> Self {
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        self
    }

    /// Listing page range requested by the operator.
    pub fn pagination(&self) -> PaginationBounds {
        PaginationBounds::new(self.start_page_number, self.final_page_number)
    }

    /// Price window requested by the operator.
    pub fn pricing(&self) -> PriceBounds {
        PriceBounds::new(self.min_price, self.max_price)
    }

    /// Rejects a minimum price without a maximum.
    ///
    /// Listings are validated against `min_price <= max_price`, so a minimum
    /// with the default maximum of 0 would reject every listing seed.
    pub fn validate_pricing(&self) -> Result<()> {
        if self.min_price > 0.0 && self.max_price == 0.0 {
            anyhow::bail!(
                "Minimum price {} is set without a maximum price. Set --max-price to at least \
                 the minimum price.",
                self.min_price
            );
        }
        Ok(())
    }

    /// Path of the base product dataset.
    pub fn products_path(&self) -> PathBuf {
        self.storage_dir.join("products.jsonl")
    }

    /// Path of the merged review dataset.
    pub fn reviews_path(&self) -> PathBuf {
        self.storage_dir.join("reviews.jsonl")
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
