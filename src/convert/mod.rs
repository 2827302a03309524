//! The HTML → Markdown conversion pipeline.
//!
//! Three layers compose per page: a base strategy renders Markdown
//! (layer 1), an optional LLM choice picks which base strategy to run
//! (layer 2), and an optional LLM loop polishes the result (layer 3).
//! Which layers are active depends on the crawl mode, the configured
//! strategy, and whether an LLM provider was supplied.

pub mod markdown;
pub mod optimizer;
pub mod selector;
pub mod strategies;

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::config::{ConversionStrategy, CrawlMode, FetchConfig};
use crate::error::ConversionError;
use crate::llm::LlmClient;
use crate::utils::collapse_whitespace;
use crate::utils::constants::DEFAULT_OPTIMIZER_ITERATIONS;

pub use markdown::html_to_markdown;
pub use selector::BaseStrategy;
pub use strategies::CustomConverter;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

/// Extract the document title, if the page declares one.
#[must_use]
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let title = document.select(&TITLE_SELECTOR).next()?;
    let text = collapse_whitespace(&title.text().collect::<String>());
    if text.is_empty() { None } else { Some(text) }
}

/// Per-crawl converter composing the three layers.
#[derive(Clone)]
pub struct Converter {
    configured: Option<ConversionStrategy>,
    custom: Option<CustomConverter>,
    llm: Option<LlmClient>,
    selector_enabled: bool,
    optimizer_enabled: bool,
    default_base: BaseStrategy,
    max_iterations: u32,
}

impl Converter {
    #[must_use]
    pub fn new(config: &FetchConfig, llm: Option<LlmClient>) -> Self {
        let (default_base, selector_enabled, optimizer_enabled) = match config.mode() {
            CrawlMode::Simple => (BaseStrategy::Default, false, false),
            CrawlMode::Smart => (BaseStrategy::Readability, true, false),
            CrawlMode::Agent => (BaseStrategy::Readability, true, true),
        };

        Self {
            configured: config.conversion_strategy(),
            custom: config.custom_converter().cloned(),
            llm,
            selector_enabled,
            optimizer_enabled: optimizer_enabled || config.optimize_conversion(),
            default_base,
            max_iterations: DEFAULT_OPTIMIZER_ITERATIONS,
        }
    }

    /// Override the optimizer's iteration budget (default 2).
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Convert one page.
    ///
    /// Only the custom strategy can fail; every LLM layer degrades to its
    /// fallback instead of erroring.
    pub async fn convert(&self, html: &str, url: &Url) -> Result<String, ConversionError> {
        let markdown = if self.configured == Some(ConversionStrategy::Custom) {
            let converter = self.custom.as_ref().ok_or_else(|| {
                ConversionError::new(url.as_str(), "custom strategy configured without a converter")
            })?;
            strategies::convert_custom(converter, html, url).await?
        } else {
            let base = match (&self.llm, self.selector_enabled) {
                (Some(llm), true) => {
                    selector::select_strategy(llm, html, url, self.default_base).await
                }
                _ => match self.configured {
                    Some(ConversionStrategy::Default) => BaseStrategy::Default,
                    Some(ConversionStrategy::Readability) => BaseStrategy::Readability,
                    _ => self.default_base,
                },
            };
            match base {
                BaseStrategy::Default => strategies::convert_default(html, url),
                BaseStrategy::Readability => strategies::convert_readability(html, url),
            }
        };

        let markdown = match (&self.llm, self.optimizer_enabled) {
            (Some(llm), true) => {
                optimizer::optimize(llm, html, url, markdown, self.max_iterations).await
            }
            _ => markdown,
        };

        Ok(markdown)
    }
}
