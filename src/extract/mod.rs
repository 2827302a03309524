//! Link extraction and filtering.
//!
//! Parses a fetched page, resolves every `<a href>` against the page URL,
//! and applies the crawl's filters: same-domain, path-prefix boundary,
//! include/exclude globs. Each surviving link carries its anchor text and
//! up to 200 characters of surrounding block-level context for the LLM
//! classifiers.

pub mod glob;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use crate::error::ConfigError;
use crate::utils::constants::LINK_CONTEXT_MAX_CHARS;
use crate::utils::{collapse_whitespace, truncate_chars};
use glob::GlobSet;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

/// Schemes that never lead to a fetchable page.
const SKIPPED_SCHEMES: [&str; 4] = ["mailto:", "javascript:", "tel:", "data:"];

/// Elements considered block-level when hunting for link context.
const BLOCK_TAGS: [&str; 23] = [
    "p", "li", "td", "th", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "dd", "dt",
    "figcaption", "caption", "article", "section", "div", "header", "footer", "nav", "aside",
    "main",
];

/// An absolute, query- and fragment-free link found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub url: String,
    /// Anchor text, whitespace-collapsed.
    pub text: String,
    /// Collapsed text of the nearest block-level ancestor, truncated.
    pub context: String,
}

/// Link extractor with filters compiled once per crawl.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    same_domain_only: bool,
    path_prefix: Option<String>,
    include: GlobSet,
    exclude: GlobSet,
}

impl LinkExtractor {
    /// Compile the filter set. A path prefix missing its leading `/` gets
    /// one added.
    pub fn new(
        include_patterns: &[String],
        exclude_patterns: &[String],
        path_prefix: Option<&str>,
        same_domain_only: bool,
    ) -> Result<Self, ConfigError> {
        let path_prefix = path_prefix.map(|prefix| {
            if prefix.starts_with('/') {
                prefix.to_string()
            } else {
                format!("/{prefix}")
            }
        });

        Ok(Self {
            same_domain_only,
            path_prefix,
            include: GlobSet::compile(include_patterns)?,
            exclude: GlobSet::compile(exclude_patterns)?,
        })
    }

    /// Extract filtered, deduplicated links in document order.
    #[must_use]
    pub fn extract(&self, html: &str, page_url: &Url) -> Vec<ExtractedLink> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for anchor in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href = href.trim();

            if href.is_empty() || href.starts_with('#') {
                continue;
            }
            let lowered = href.to_ascii_lowercase();
            if SKIPPED_SCHEMES
                .iter()
                .any(|scheme| lowered.starts_with(scheme))
            {
                continue;
            }

            let Ok(mut resolved) = page_url.join(href) else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            resolved.set_fragment(None);
            resolved.set_query(None);

            if !self.passes_filters(&resolved, page_url) {
                continue;
            }

            let absolute = resolved.to_string();
            if !seen.insert(absolute.clone()) {
                continue;
            }

            links.push(ExtractedLink {
                url: absolute,
                text: collapse_whitespace(&anchor.text().collect::<String>()),
                context: link_context(anchor),
            });
        }

        links
    }

    fn passes_filters(&self, resolved: &Url, page_url: &Url) -> bool {
        if self.same_domain_only && resolved.host_str() != page_url.host_str() {
            return false;
        }

        let pathname = resolved.path();

        if let Some(prefix) = &self.path_prefix {
            if !path_matches_prefix(pathname, prefix) {
                return false;
            }
        }

        if !self.include.is_empty() && !self.include.matches(pathname) {
            return false;
        }

        if self.exclude.matches(pathname) {
            return false;
        }

        true
    }
}

/// Prefix match at a path boundary: equal, prefix ends in `/`, or the next
/// character is `/`.
fn path_matches_prefix(pathname: &str, prefix: &str) -> bool {
    if pathname == prefix {
        return true;
    }
    if !pathname.starts_with(prefix) {
        return false;
    }
    prefix.ends_with('/') || pathname.as_bytes().get(prefix.len()) == Some(&b'/')
}

/// Collapsed text of the nearest block-level ancestor, falling back to the
/// anchor's own text.
fn link_context(anchor: ElementRef<'_>) -> String {
    for node in anchor.ancestors() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        if BLOCK_TAGS.contains(&element.value().name()) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            return truncate_chars(&text, LINK_CONTEXT_MAX_CHARS);
        }
    }
    truncate_chars(
        &collapse_whitespace(&anchor.text().collect::<String>()),
        LINK_CONTEXT_MAX_CHARS,
    )
}
