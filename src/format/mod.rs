//! Output formatting for crawled records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::crawl::Request;
use crate::walmart::ProductRecord;

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a single record.
    pub fn format_record(&self, record: &ProductRecord) -> String {
        match self.format {
            OutputFormat::Json => self.json(record, "{}"),
            OutputFormat::Table => self.table_single(record),
            OutputFormat::Markdown => self.markdown_single(record),
            OutputFormat::Csv => self.csv_records(std::slice::from_ref(record)),
        }
    }

    /// Formats multiple records.
    pub fn format_records(&self, records: &[ProductRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header().to_string(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json(records, "[]"),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    /// Formats classified requests (label and URL).
    pub fn format_requests(&self, requests: &[Request]) -> String {
        match self.format {
            OutputFormat::Json => self.json(requests, "[]"),
            OutputFormat::Table => requests
                .iter()
                .map(|r| format!("{:<12}  {}", r.label.to_string(), r.url))
                .collect::<Vec<_>>()
                .join("\n"),
            OutputFormat::Markdown => {
                let mut lines =
                    vec!["| Label | URL |".to_string(), "|-------|-----|".to_string()];
                lines.extend(requests.iter().map(|r| format!("| {} | {} |", r.label, r.url)));
                lines.join("\n")
            }
            OutputFormat::Csv => {
                let mut lines = vec!["label,url".to_string()];
                lines.extend(
                    requests.iter().map(|r| format!("{},{}", r.label, Self::csv_escape(&r.url))),
                );
                lines.join("\n")
            }
        }
    }

    fn json<T: serde::Serialize + ?Sized>(&self, value: &T, fallback: &str) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| fallback.to_string())
    }

    // Table formatting

    fn table_single(&self, record: &ProductRecord) -> String {
        let mut lines = Vec::new();

        lines.push(format!("SKU:      {}", record.sku().unwrap_or("N/A")));
        lines.push(format!("Title:    {}", record.title));
        lines.push(format!("URL:      {}", record.url));
        lines.push(format!("Price:    {}", price_label(record)));

        match (record.rating.item_rating, record.rating.item_reviews) {
            (Some(stars), Some(count)) => {
                lines.push(format!("Rating:   {:.1}/5 ({} ratings)", stars, count))
            }
            (Some(stars), None) => lines.push(format!("Rating:   {:.1}/5", stars)),
            _ => lines.push("Rating:   N/A".to_string()),
        }

        if let Some(brand) = &record.seller.brand {
            lines.push(format!("Brand:    {}", brand));
        }
        if let Some(seller) = &record.seller.seller {
            lines.push(format!("Seller:   {}", seller));
        }
        if let Some(path) = &record.category.full_path {
            lines.push(format!("Category: {}", path));
        }

        lines.push(format!(
            "Stock:    {}",
            if record.is_available { "In Stock" } else { "Out of Stock" }
        ));
        lines.push(format!("Reviews:  {}", reviews_label(record)));

        lines.join("\n")
    }

    fn table_records(&self, records: &[ProductRecord]) -> String {
        let sku_width = 12;
        let price_width = 10;
        let rating_width = 6;
        let reviews_width = 8;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<sku_width$}  {:<price_width$}  {:<rating_width$}  {:<reviews_width$}  {}",
            "SKU", "Price", "Rating", "Reviews", "Title"
        ));
        lines.push(format!(
            "{:-<sku_width$}  {:-<price_width$}  {:-<rating_width$}  {:-<reviews_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for record in records {
            let price_str = record.sale_price().map(|p| format!("{:.2}", p));
            let rating_str = record.rating.item_rating.map(|r| format!("{:.1}", r));

            lines.push(format!(
                "{:<sku_width$}  {:>price_width$}  {:>rating_width$}  {:>reviews_width$}  {}",
                record.sku().unwrap_or("N/A"),
                price_str.as_deref().unwrap_or("N/A"),
                rating_str.as_deref().unwrap_or("N/A"),
                record.reviews_model.reviews.len(),
                truncate(&record.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_single(&self, record: &ProductRecord) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", record.title));
        lines.push(String::new());

        lines.push(format!("- **SKU:** {}", record.sku().unwrap_or("N/A")));
        lines.push(format!("- **URL:** [View on Walmart]({})", record.url));

        match (record.sale_price(), record.pricing.full_price) {
            (Some(price), Some(was)) if was > price => lines.push(format!(
                "- **Price:** {}{:.2} ~~{:.2}~~",
                currency(record),
                price,
                was
            )),
            (Some(price), _) => {
                lines.push(format!("- **Price:** {}{:.2}", currency(record), price))
            }
            (None, _) => {}
        }

        if let Some(stars) = record.rating.item_rating {
            lines.push(format!("- **Rating:** {:.1}/5", stars));
        }

        if let Some(brand) = &record.seller.brand {
            lines.push(format!("- **Brand:** {}", brand));
        }

        lines.push(format!("- **Reviews:** {}", reviews_label(record)));

        lines.join("\n")
    }

    fn markdown_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| SKU | Price | Rating | Reviews | Title |".to_string());
        lines.push("|-----|-------|--------|---------|-------|".to_string());

        for record in records {
            let price_str =
                record.sale_price().map(|p| format!("{:.2}", p)).unwrap_or_else(|| "N/A".into());
            let rating_str = record
                .rating
                .item_rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "N/A".into());

            lines.push(format!(
                "| {} | {} | {} | {} | [{}]({}) |",
                record.sku().unwrap_or("N/A"),
                price_str,
                rating_str,
                record.reviews_model.reviews.len(),
                truncate(&record.title, 40),
                record.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header() -> &'static str {
        "sku,upc,title,price,full_price,currency,rating,ratings,available,brand,seller,\
         review_pages,reviews_collected,url"
    }

    fn csv_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(Self::csv_header().to_string());

        for record in records {
            let opt = |v: Option<&str>| v.map(Self::csv_escape).unwrap_or_default();

            lines.push(format!(
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                opt(record.id_codes.sku.as_deref()),
                opt(record.id_codes.upc.as_deref()),
                Self::csv_escape(&record.title),
                record.sale_price().map(|p| p.to_string()).unwrap_or_default(),
                record.pricing.full_price.map(|p| p.to_string()).unwrap_or_default(),
                opt(record.pricing.currency_symbol.as_deref()),
                record.rating.item_rating.map(|r| r.to_string()).unwrap_or_default(),
                record.rating.item_reviews.map(|r| r.to_string()).unwrap_or_default(),
                record.is_available,
                opt(record.seller.brand.as_deref()),
                opt(record.seller.seller.as_deref()),
                record.reviews_model.pages_count,
                record.reviews_model.reviews.len(),
                Self::csv_escape(&record.url)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn currency(record: &ProductRecord) -> &str {
    record.pricing.currency_symbol.as_deref().unwrap_or("$")
}

fn price_label(record: &ProductRecord) -> String {
    match (record.sale_price(), record.pricing.full_price) {
        (Some(price), Some(was)) if was > price => {
            format!("{}{:.2} (was {:.2})", currency(record), price, was)
        }
        (Some(price), _) => format!("{}{:.2}", currency(record), price),
        (None, _) => "N/A".to_string(),
    }
}

fn reviews_label(record: &ProductRecord) -> String {
    let model = &record.reviews_model;
    if model.is_resolved() {
        format!("{} collected over {} pages", model.reviews.len(), model.pages_count)
    } else {
        "not collected".to_string()
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}
