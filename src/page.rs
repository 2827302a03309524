//! Page data flowing through the fetch → convert → write pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A page as it came off the wire, before conversion.
///
/// `url` is the final URL after redirects, which may differ from the URL
/// that was requested. Immutable once produced by the fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPageRaw {
    pub url: String,
    pub html: String,
    pub status: u16,
    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,
    pub fetched_at: DateTime<Utc>,
}

/// A fetched page with its Markdown rendition attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    #[serde(flatten)]
    pub raw: FetchedPageRaw,
    pub markdown: String,
    pub title: Option<String>,
    /// Link-follow hops from the root; 0 for the root itself. Agent mode
    /// stores everything at depth 0.
    pub depth: usize,
}

impl FetchedPage {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.raw.url
    }
}

/// A URL the crawler dequeued but declined to keep, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPage {
    pub url: String,
    pub reason: String,
}

impl SkippedPage {
    #[must_use]
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    pub total_pages: usize,
    pub total_skipped: usize,
    pub duration_ms: u64,
}

/// Everything a finished crawl produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub pages: Vec<FetchedPage>,
    pub skipped: Vec<SkippedPage>,
    pub output_dir: PathBuf,
    pub stats: CrawlStats,
    /// Path of the generated `INDEX.md`, when index generation ran.
    pub index_file: Option<PathBuf>,
    /// Path of the aggregated single-file artifact, when requested.
    pub single_file: Option<PathBuf>,
}
