//! Crawl engines and the shared fetch → convert → write core.
//!
//! The simple and smart crawlers share one BFS engine; smart adds an LLM
//! classification pass over extracted links. The agent crawler drives the
//! same core from an LLM conversation instead of a queue.

pub mod agent;
pub mod observer;
pub mod simple;
pub mod smart;

pub use agent::AgentCrawler;
pub use observer::{CrawlObserver, NoOpObserver};
pub use simple::SimpleCrawler;
pub use smart::SmartCrawler;

use futures::future::join_all;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::config::FetchConfig;
use crate::convert::{Converter, extract_title};
use crate::cookies::CookieJar;
use crate::error::{ConfigError, FetchError};
use crate::extract::LinkExtractor;
use crate::fetch::{AdaptiveRateLimiter, FetchQueue, HttpFetcher};
use crate::llm::LlmClient;
use crate::output::OutputWriter;
use crate::page::{CrawlStats, FetchResult, FetchedPage, FetchedPageRaw, SkippedPage};
use crate::utils::normalize_url;
use self::smart::LinkClassifier;

/// Everything a crawl engine needs: config, the fetch pipeline, the
/// converter, the writer, and the observer.
pub(crate) struct CrawlCore {
    pub(crate) config: Arc<FetchConfig>,
    pub(crate) fetcher: HttpFetcher,
    pub(crate) queue: FetchQueue,
    pub(crate) converter: Converter,
    pub(crate) writer: OutputWriter,
    pub(crate) observer: Arc<dyn CrawlObserver>,
    pub(crate) llm: Option<LlmClient>,
}

impl CrawlCore {
    pub(crate) async fn initialize(
        config: Arc<FetchConfig>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let cookies = match config.cookie_file() {
            Some(path) => Some(CookieJar::load(path).await?),
            None => None,
        };

        let limiter = Arc::new(AdaptiveRateLimiter::new(
            config.delay(),
            config.max_retries(),
            config.adaptive_rate_limit(),
        ));

        let fetcher = HttpFetcher::new(
            config.headers(),
            cookies,
            config.respect_robots(),
            Arc::clone(&limiter),
        )
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let queue = FetchQueue::new(config.concurrency(), limiter);

        let llm = config
            .llm_provider()
            .map(|provider| LlmClient::new(Arc::clone(provider), config.effective_llm_config()));
        let converter = Converter::new(&config, llm.clone());
        let writer = OutputWriter::new(config.output_dir(), config.output_structure());

        Ok(Self {
            config,
            fetcher,
            queue,
            converter,
            writer,
            observer,
            llm,
        })
    }

    /// Fetch one URL through the bounded queue and the rate limiter.
    pub(crate) async fn fetch(&self, url: &str) -> Result<FetchedPageRaw, FetchError> {
        self.queue.run(|| self.fetcher.fetch(url)).await
    }

    /// Convert a raw page and stream it to the output tree.
    pub(crate) async fn process_page(
        &self,
        raw: FetchedPageRaw,
        depth: usize,
    ) -> anyhow::Result<FetchedPage> {
        let url = Url::parse(&raw.url)?;
        let markdown = self.converter.convert(&raw.html, &url).await?;
        let title = extract_title(&raw.html);

        let page = FetchedPage {
            raw,
            markdown,
            title,
            depth,
        };
        self.writer.write_page(&page).await?;
        Ok(page)
    }
}

/// FIFO BFS shared by the simple and smart crawlers.
///
/// The visited set is updated at dequeue time, before the fetch starts, so
/// a concurrent extraction of the same link cannot enqueue a duplicate
/// fetch. Waves of up to `concurrency` fetches run in parallel, capped at
/// the remaining page budget; all bookkeeping happens between waves on the
/// engine's own control flow.
pub(crate) async fn run_bfs(
    core: &CrawlCore,
    extractor: &LinkExtractor,
    classifier: Option<&LinkClassifier>,
) -> FetchResult {
    let started = Instant::now();
    let max_pages = core.config.max_pages();
    let max_depth = core.config.max_depth();

    let mut queue: VecDeque<(String, usize)> = VecDeque::new();
    queue.push_back((core.config.url().to_string(), 0));

    let mut visited: HashSet<String> = HashSet::new();
    let mut pages: Vec<FetchedPage> = Vec::new();
    let mut skipped: Vec<SkippedPage> = Vec::new();

    while !queue.is_empty() && pages.len() < max_pages {
        let wave_cap = core.config.concurrency().min(max_pages - pages.len());
        let mut wave: Vec<(String, usize)> = Vec::new();

        while wave.len() < wave_cap {
            let Some((url, depth)) = queue.pop_front() else {
                break;
            };
            let normalized = normalize_url(&url);
            if visited.contains(&normalized) {
                continue;
            }
            if depth > max_depth {
                let reason = format!("depth {depth} exceeds maximum {max_depth}");
                core.observer.on_page_skipped(&url, &reason);
                skipped.push(SkippedPage::new(url, reason));
                continue;
            }
            visited.insert(normalized);
            wave.push((url, depth));
        }

        if wave.is_empty() {
            break;
        }

        debug!(
            target: "website_fetch::crawl",
            "dispatching wave of {} ({}/{max_pages} pages)",
            wave.len(),
            pages.len()
        );

        let fetches = join_all(wave.iter().map(|(url, _)| core.fetch(url))).await;

        for ((url, depth), fetched) in wave.into_iter().zip(fetches) {
            let raw = match fetched {
                Ok(raw) => raw,
                Err(e) => {
                    core.observer.on_error(&url, &e);
                    skipped.push(SkippedPage::new(&url, e.to_string()));
                    continue;
                }
            };

            match core.process_page(raw, depth).await {
                Ok(page) => {
                    core.observer.on_page_fetched(&page);

                    if pages.len() + 1 < max_pages {
                        if let Ok(page_url) = Url::parse(page.url()) {
                            let mut links = extractor.extract(&page.raw.html, &page_url);
                            if let Some(classifier) = classifier {
                                links = classifier.classify(links).await;
                            }
                            for link in links {
                                if !visited.contains(&normalize_url(&link.url)) {
                                    queue.push_back((link.url, depth + 1));
                                }
                            }
                        }
                    }

                    pages.push(page);
                }
                Err(e) => {
                    core.observer.on_error(&url, e.as_ref());
                    skipped.push(SkippedPage::new(&url, format!("{e:#}")));
                }
            }
        }
    }

    finish_result(core, pages, skipped, started).await
}

/// Assemble the `FetchResult` and produce post-crawl artifacts.
pub(crate) async fn finish_result(
    core: &CrawlCore,
    pages: Vec<FetchedPage>,
    skipped: Vec<SkippedPage>,
    started: Instant,
) -> FetchResult {
    let mut result = FetchResult {
        stats: CrawlStats {
            total_pages: pages.len(),
            total_skipped: skipped.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        },
        pages,
        skipped,
        output_dir: core.writer.output_dir().to_path_buf(),
        index_file: None,
        single_file: None,
    };

    if core.config.generate_index() && !result.pages.is_empty() {
        match core.writer.write_index(&result.pages).await {
            Ok(path) => result.index_file = Some(path),
            Err(e) => warn!(target: "website_fetch::output", "failed to write index: {e:#}"),
        }
    }

    if core.config.single_file() && !result.pages.is_empty() {
        match core.writer.write_aggregate(&result.pages).await {
            Ok(path) => result.single_file = Some(path),
            Err(e) => warn!(target: "website_fetch::output", "failed to write aggregate: {e:#}"),
        }
    }

    result
}
