//! Per-origin robots.txt fetch, parse, and cache.
//!
//! The first query for a new origin fetches `<origin>/robots.txt` with a
//! short timeout. Any failure — non-2xx, network error, timeout, or a
//! parser refusal — caches an allow-all entry: an unreachable robots file
//! never blocks a crawl. Entries live for the lifetime of the crawler.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use texting_robots::Robot;
use tracing::debug;
use url::Url;

use crate::utils::constants::ROBOTS_TIMEOUT_SECS;
use crate::utils::origin_of;

/// Cached robots decision state for one origin.
///
/// `robot: None` means allow-all (the synthesized entry for unreachable or
/// malformed robots files).
pub struct RobotsEntry {
    robot: Option<Robot>,
    crawl_delay: Option<Duration>,
}

impl RobotsEntry {
    fn allow_all() -> Self {
        Self {
            robot: None,
            crawl_delay: None,
        }
    }

    #[must_use]
    pub fn is_allowed(&self, url: &str) -> bool {
        match &self.robot {
            Some(robot) => robot.allowed(url),
            None => true,
        }
    }

    #[must_use]
    pub fn crawl_delay(&self) -> Option<Duration> {
        self.crawl_delay
    }
}

/// Lazily-populated robots.txt cache keyed by origin.
pub struct RobotsCache {
    client: reqwest::Client,
    user_agent: String,
    entries: DashMap<String, Arc<RobotsEntry>>,
}

impl RobotsCache {
    #[must_use]
    pub fn new(client: reqwest::Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            entries: DashMap::new(),
        }
    }

    /// Whether our user agent may fetch this URL.
    ///
    /// Rules that match no URL are treated as allowed; ambiguity fails open.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.entry_for(url).await.is_allowed(url.as_str())
    }

    /// `Crawl-delay` for our agent at this URL's origin, if declared.
    pub async fn crawl_delay(&self, url: &Url) -> Option<Duration> {
        self.entry_for(url).await.crawl_delay()
    }

    async fn entry_for(&self, url: &Url) -> Arc<RobotsEntry> {
        let origin = origin_of(url);

        if let Some(entry) = self.entries.get(&origin) {
            return Arc::clone(entry.value());
        }

        let entry = Arc::new(self.fetch_entry(&origin).await);
        // A concurrent first query for the same origin may have raced us
        // here; last insert wins and both entries are equivalent.
        self.entries.insert(origin, Arc::clone(&entry));
        entry
    }

    async fn fetch_entry(&self, origin: &str) -> RobotsEntry {
        let robots_url = format!("{origin}/robots.txt");

        let response = tokio::time::timeout(
            Duration::from_secs(ROBOTS_TIMEOUT_SECS),
            self.client.get(&robots_url).send(),
        )
        .await;

        let body = match response {
            Ok(Ok(resp)) if resp.status().is_success() => match resp.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(
                        target: "website_fetch::robots",
                        "failed to read {robots_url}: {e}; allowing all"
                    );
                    return RobotsEntry::allow_all();
                }
            },
            Ok(Ok(resp)) => {
                debug!(
                    target: "website_fetch::robots",
                    "{robots_url} answered {}; allowing all",
                    resp.status()
                );
                return RobotsEntry::allow_all();
            }
            Ok(Err(e)) => {
                debug!(
                    target: "website_fetch::robots",
                    "failed to fetch {robots_url}: {e}; allowing all"
                );
                return RobotsEntry::allow_all();
            }
            Err(_) => {
                debug!(
                    target: "website_fetch::robots",
                    "timed out fetching {robots_url} after {ROBOTS_TIMEOUT_SECS}s; allowing all"
                );
                return RobotsEntry::allow_all();
            }
        };

        match Robot::new(&self.user_agent, body.as_bytes()) {
            Ok(robot) => {
                let crawl_delay = robot
                    .delay
                    .map(|secs| Duration::from_secs_f64(f64::from(secs)));
                debug!(
                    target: "website_fetch::robots",
                    "cached robots for {origin} (crawl-delay: {crawl_delay:?})"
                );
                RobotsEntry {
                    robot: Some(robot),
                    crawl_delay,
                }
            }
            Err(e) => {
                debug!(
                    target: "website_fetch::robots",
                    "failed to parse {robots_url}: {e}; allowing all"
                );
                RobotsEntry::allow_all()
            }
        }
    }

    /// Number of origins currently cached.
    #[must_use]
    pub fn cached_origins(&self) -> usize {
        self.entries.len()
    }
}
