//! Rule-based BFS crawler.

use std::sync::Arc;

use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::extract::LinkExtractor;
use crate::page::FetchResult;

use super::{CrawlCore, CrawlObserver, run_bfs};

/// BFS crawler whose link-following decisions are purely rule-based:
/// same-domain plus the configured include/exclude globs. The path prefix
/// is not applied in this mode.
pub struct SimpleCrawler {
    core: CrawlCore,
    extractor: LinkExtractor,
}

impl SimpleCrawler {
    pub async fn new(
        config: Arc<FetchConfig>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, ConfigError> {
        let extractor = LinkExtractor::new(
            config.include_patterns(),
            config.exclude_patterns(),
            None,
            true,
        )?;
        let core = CrawlCore::initialize(config, observer).await?;
        Ok(Self { core, extractor })
    }

    /// Run the crawl to completion.
    pub async fn run(&self) -> FetchResult {
        run_bfs(&self.core, &self.extractor, None).await
    }
}
