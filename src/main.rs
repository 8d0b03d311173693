//! walmart-crawler - Walmart catalog crawler CLI
//!
//! A Rust implementation with TLS fingerprint emulation for reliable scraping.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use walmart_crawler::commands::{
    ClassifyCommand, CrawlCommand, DatasetKind, ReviewsCommand, ShowCommand,
};
use walmart_crawler::config::{Config, OutputFormat};
use walmart_crawler::crawl::CrawlInput;

#[derive(Parser)]
#[command(
    name = "walmart-crawler",
    version,
    about = "Walmart catalog crawler",
    long_about = "Crawls Walmart listings and product pages into a product dataset, then collects \
                  every product's reviews page by page into a reviews dataset."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "WM_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "WM_DELAY")]
    delay: Option<u64>,

    /// Directory holding the datasets
    #[arg(long, global = true, env = "WM_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Requests handled at once
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Retries for blocked or failed requests
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CrawlArgs {
    /// Product page URL (repeatable)
    #[arg(long = "product-url", value_name = "URL")]
    product_urls: Vec<String>,

    /// Category, search or brand page URL (repeatable)
    #[arg(long = "listing-url", value_name = "URL")]
    listing_urls: Vec<String>,

    /// Search keyword (repeatable)
    #[arg(short, long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// JSON file with productUrls, listingUrls and keywords
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// First listing page (0 together with --final-page 0 = all pages)
    #[arg(long)]
    start_page: Option<u32>,

    /// Last listing page, inclusive
    #[arg(long)]
    final_page: Option<u32>,

    /// Minimum price of exported products
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price of exported products (required with --min-price)
    #[arg(long)]
    max_price: Option<f64>,
}

impl CrawlArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(start) = self.start_page {
            config.start_page_number = start;
        }
        if let Some(last) = self.final_page {
            config.final_page_number = last;
        }
        if let Some(min) = self.min_price {
            config.min_price = min;
        }
        if let Some(max) = self.max_price {
            config.max_price = max;
        }
    }

    fn input(&self) -> Result<CrawlInput> {
        let from_args = CrawlInput {
            product_urls: self.product_urls.clone(),
            listing_urls: self.listing_urls.clone(),
            keywords: self.keywords.clone(),
        };

        match &self.input {
            Some(path) => Ok(CrawlInput::from_file(path)?.merge(from_args)),
            None => Ok(from_args),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listings and product pages into the product dataset
    #[command(alias = "c")]
    Crawl(CrawlArgs),

    /// Collect reviews for every product in the product dataset
    #[command(alias = "r")]
    Reviews,

    /// Crawl, then collect reviews
    Run(CrawlArgs),

    /// Show which handler each URL would be routed to
    Classify {
        /// URLs to classify
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Print a dataset
    Show {
        /// Dataset to print (products, reviews)
        #[arg(default_value = "products")]
        dataset: DatasetKind,

        /// Only the record with this SKU
        #[arg(long)]
        sku: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(n) = cli.max_concurrency {
        config.max_concurrency = n;
    }
    if let Some(n) = cli.max_retries {
        config.max_request_retries = n;
    }

    match cli.command {
        Commands::Crawl(args) => {
            args.apply(&mut config);
            let stats = CrawlCommand::new(config).execute(&args.input()?).await?;
            println!("Crawl finished: {}", stats);
        }

        Commands::Reviews => {
            let stats = ReviewsCommand::new(config).execute().await?;
            println!("Reviews finished: {}", stats);
        }

        Commands::Run(args) => {
            args.apply(&mut config);
            let base = CrawlCommand::new(config.clone()).execute(&args.input()?).await?;
            println!("Crawl finished: {}", base);

            let reviews = ReviewsCommand::new(config).execute().await?;
            println!("Reviews finished: {}", reviews);
        }

        Commands::Classify { urls } => {
            let output = ClassifyCommand::new(config).execute(&urls)?;
            println!("{}", output);
        }

        Commands::Show { dataset, sku } => {
            let output = ShowCommand::new(config).execute(dataset, sku.as_deref())?;
            println!("{}", output);
        }
    }

    Ok(())
}
