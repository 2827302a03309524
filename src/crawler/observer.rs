//! Observer interface for crawl lifecycle events.
//!
//! Passed explicitly into the crawler rather than smuggled through the
//! config. All methods default to no-ops, so implementations override
//! only what they watch.

use crate::page::FetchedPage;

pub trait CrawlObserver: Send + Sync {
    /// A page was fetched, converted, and written to the output tree.
    fn on_page_fetched(&self, _page: &FetchedPage) {}

    /// A dequeued URL was visibly skipped.
    fn on_page_skipped(&self, _url: &str, _reason: &str) {}

    /// A fetch/convert/write failure, or a fatal agent-loop LLM error.
    fn on_error(&self, _url: &str, _error: &(dyn std::error::Error + Send + Sync)) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl CrawlObserver for NoOpObserver {}
