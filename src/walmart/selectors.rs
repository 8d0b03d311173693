//! CSS selectors and embedded-data paths for Walmart pages.
//!
//! Walmart renders with Next.js, so nearly everything we need lives in the
//! `__NEXT_DATA__` JSON blob. The JSON pointers below are relative to it.
//!
//! **Update process**: when parsing fails, capture an HTML sample, update the
//! paths here and add a fixture under `tests/fixtures/`.

use scraper::Selector;
use std::sync::LazyLock;

/// Script tag carrying the page state.
pub static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

/// Paths into listing (browse, search, brand) pages.
pub mod listing {
    /// Search result block shared by browse, search and brand pages.
    pub const SEARCH_RESULT: &str = "/props/pageProps/initialData/searchResult";

    /// Highest page number, relative to [`SEARCH_RESULT`].
    pub const MAX_PAGE: &str = "/paginationV2/maxPage";

    /// Item stacks, relative to [`SEARCH_RESULT`].
    pub const ITEM_STACKS: &str = "/itemStacks";
}

/// Paths into product detail pages.
pub mod product {
    pub const PRODUCT: &str = "/props/pageProps/initialData/data/product";

    /// Idml block holding descriptions and specifications.
    pub const IDML: &str = "/props/pageProps/initialData/data/idml";
}

/// Paths into review pages.
pub mod reviews {
    pub const REVIEWS: &str = "/props/pageProps/initialData/data/reviews";
}

/// Markers for bot-challenge pages.
pub mod blocked {
    use super::*;

    /// Path segment Walmart redirects to when a request is blocked.
    pub const URL_MARKER: &str = "/blocked";

    /// Press-and-hold challenge container.
    pub static CHALLENGE: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "#px-captcha, \
             div[class*='px-captcha']",
        )
        .unwrap()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        let _ = &*NEXT_DATA;
        let _ = &*blocked::CHALLENGE;
    }

    #[test]
    fn test_next_data_matching() {
        let html = Html::parse_document(
            r#"<html><body>
                <script id="other">{}</script>
                <script id="__NEXT_DATA__" type="application/json">{"props":{}}</script>
            </body></html>"#,
        );

        let scripts: Vec<_> = html.select(&NEXT_DATA).collect();
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].inner_html(), r#"{"props":{}}"#);
    }

    #[test]
    fn test_challenge_matching() {
        let html = Html::parse_document(r#"<div id="px-captcha"></div>"#);
        assert!(html.select(&blocked::CHALLENGE).next().is_some());

        let html = Html::parse_document(r#"<div class="product"></div>"#);
        assert!(html.select(&blocked::CHALLENGE).next().is_none());
    }
}
