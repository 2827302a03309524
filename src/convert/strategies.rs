//! Base conversion strategies.
//!
//! All strategies take `(html, url)` and yield Markdown. `default` renders
//! the whole document; `readability` runs a semantic-container extraction
//! pass first and falls back to the full document when it finds nothing;
//! `custom` delegates to a caller-supplied async function.

use futures::future::BoxFuture;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::convert::markdown::html_to_markdown;
use crate::error::ConversionError;

/// Caller-supplied conversion function for the `custom` strategy.
///
/// Receives `(html, url)`; errors propagate unchanged to the crawler.
pub type CustomConverter =
    Arc<dyn Fn(String, String) -> BoxFuture<'static, Result<String, ConversionError>> + Send + Sync>;

// Containers tried in priority order by the readability pass. Hardcoded
// selectors never fail to parse; a failure here is a compile-time bug.
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "main",
        "article",
        "[role='main']",
        "#main-content",
        ".main-content",
        "#content",
        ".content",
        ".post-content",
        ".entry-content",
        "[itemprop='articleBody']",
        ".article-body",
        "body",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("BUG: hardcoded CSS selector is invalid"))
    .collect()
});

/// The `default` strategy: render the document as-is.
#[must_use]
pub fn convert_default(html: &str, _url: &Url) -> String {
    html_to_markdown(html)
}

/// The `readability` strategy: extract the main content container first.
#[must_use]
pub fn convert_readability(html: &str, url: &Url) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    match extract_article(html) {
        Some(article) => html_to_markdown(&article),
        None => {
            debug!(
                target: "website_fetch::convert",
                "no content container found on {url}; converting full document"
            );
            html_to_markdown(html)
        }
    }
}

/// The `custom` strategy: delegate wholly to the supplied function.
pub async fn convert_custom(
    converter: &CustomConverter,
    html: &str,
    url: &Url,
) -> Result<String, ConversionError> {
    converter(html.to_string(), url.to_string()).await
}

/// Find the first semantic content container with non-empty HTML.
fn extract_article(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for selector in CONTENT_SELECTORS.iter() {
        if let Some(container) = document.select(selector).next() {
            let inner = container.inner_html();
            if !inner.trim().is_empty() {
                return Some(inner);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readability_prefers_main_over_nav() {
        let html = "<body><nav><a href='/x'>chrome</a></nav>\
                    <main><h1>Article</h1><p>Body text.</p></main></body>";
        let url = Url::parse("https://example.com/").unwrap();
        let markdown = convert_readability(html, &url);
        assert!(markdown.contains("# Article"));
        assert!(!markdown.contains("chrome"));
    }

    #[test]
    fn readability_falls_back_to_full_document() {
        let url = Url::parse("https://example.com/").unwrap();
        // No body content containers at all: still converts what is there.
        let markdown = convert_readability("<h1>Bare</h1>", &url);
        assert_eq!(markdown, "# Bare");
    }

    #[test]
    fn readability_empty_input() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(convert_readability("", &url), "");
    }
}
