//! Crawl a website and mirror it as Markdown.
//!
//! Three crawl modes share one fetch → convert → write core:
//!
//! - **simple** — rule-based BFS with depth/page caps and glob filters.
//! - **smart** — the same BFS, with an LLM classifying which discovered
//!   links are worth following.
//! - **agent** — an LLM conversation drives fetch/store/skip decisions one
//!   page at a time through five tools.
//!
//! The fetch pipeline layers robots.txt caching, a Netscape cookie jar,
//! adaptive per-request rate limiting, and bounded concurrency under a
//! redirect-aware HTTP fetcher. Conversion is a three-layer chain: a base
//! strategy renders Markdown, an optional LLM call picks the strategy, and
//! an optional LLM loop polishes the result.
//!
//! ```no_run
//! use website_fetch::FetchConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = FetchConfig::builder()
//!     .url("https://example.com/docs")
//!     .max_pages(50)
//!     .output_dir("./output")
//!     .build()?;
//!
//! let result = website_fetch::crawl(config).await?;
//! println!("fetched {} pages", result.stats.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod convert;
pub mod cookies;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod output;
pub mod page;
pub mod robots;
pub mod utils;

use std::sync::Arc;

pub use config::{
    ConversionStrategy, CrawlMode, FetchConfig, FetchConfigBuilder, LinkClassification,
    OutputStructure,
};
pub use convert::{Converter, CustomConverter};
pub use cookies::{Cookie, CookieJar};
pub use crawler::{
    AgentCrawler, CrawlObserver, NoOpObserver, SimpleCrawler, SmartCrawler,
};
pub use error::{ConfigError, ConversionError, FetchError, FetchErrorKind, LlmError};
pub use extract::{ExtractedLink, LinkExtractor};
pub use fetch::{AdaptiveRateLimiter, FetchQueue, HttpFetcher};
pub use llm::{CallOptions, LlmClient, LlmConfig, LlmProvider, LlmRequest};
pub use output::OutputWriter;
pub use page::{CrawlStats, FetchResult, FetchedPage, FetchedPageRaw, SkippedPage};
pub use robots::RobotsCache;

/// Run a crawl with no observer.
pub async fn crawl(config: FetchConfig) -> Result<FetchResult, ConfigError> {
    crawl_with_observer(config, Arc::new(NoOpObserver)).await
}

/// Run a crawl, delivering lifecycle events to `observer`.
///
/// `ConfigError` is the only fatal outcome; per-page failures land in
/// `FetchResult::skipped`.
pub async fn crawl_with_observer(
    config: FetchConfig,
    observer: Arc<dyn CrawlObserver>,
) -> Result<FetchResult, ConfigError> {
    let config = Arc::new(config);

    let result = match config.mode() {
        CrawlMode::Simple => {
            SimpleCrawler::new(config, observer).await?.run().await
        }
        CrawlMode::Smart => SmartCrawler::new(config, observer).await?.run().await,
        CrawlMode::Agent => AgentCrawler::new(config, observer).await?.run().await,
    };

    Ok(result)
}
