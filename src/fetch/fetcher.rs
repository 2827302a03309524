//! HTTP fetcher with manual redirect handling.
//!
//! Redirects are followed by hand (the client has them disabled) so the
//! final URL, the redirect limit, and the missing-`Location` failure mode
//! stay under our control. Each attempt is bounded by a hard timeout, and
//! the robots gate runs before any request leaves the building.

use chrono::Utc;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, LOCATION, USER_AGENT};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::cookies::CookieJar;
use crate::error::{FetchError, FetchErrorKind};
use crate::fetch::rate_limiter::AdaptiveRateLimiter;
use crate::page::FetchedPageRaw;
use crate::robots::RobotsCache;
use crate::utils::constants::{DEFAULT_USER_AGENT, FETCH_TIMEOUT_SECS, MAX_REDIRECTS};

enum Hop {
    Redirect(Url),
    Page(FetchedPageRaw),
}

pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    extra_headers: Vec<(HeaderName, HeaderValue)>,
    cookies: Option<CookieJar>,
    robots: Option<RobotsCache>,
    limiter: Arc<AdaptiveRateLimiter>,
}

impl HttpFetcher {
    /// Build a fetcher.
    ///
    /// A `User-Agent` entry in `headers` (matched case-insensitively)
    /// replaces the default agent; all configured headers are sent as-is.
    pub fn new(
        headers: &HashMap<String, String>,
        cookies: Option<CookieJar>,
        respect_robots: bool,
        limiter: Arc<AdaptiveRateLimiter>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let user_agent = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let mut extra_headers = Vec::new();
        for (name, value) in headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => extra_headers.push((name, value)),
                _ => warn!(
                    target: "website_fetch::fetch",
                    "ignoring invalid header `{name}`"
                ),
            }
        }

        let robots = respect_robots
            .then(|| RobotsCache::new(client.clone(), user_agent.clone()));

        Ok(Self {
            client,
            user_agent,
            extra_headers,
            cookies,
            robots,
            limiter,
        })
    }

    /// Fetch one page, following up to the redirect limit.
    ///
    /// Errors always carry the originally requested URL; a successful
    /// result carries the final post-redirect URL.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPageRaw, FetchError> {
        let parsed = Url::parse(url).map_err(|e| {
            FetchError::new(
                url,
                FetchErrorKind::Network {
                    message: format!("invalid URL: {e}"),
                },
            )
        })?;

        if let Some(robots) = &self.robots {
            if !robots.is_allowed(&parsed).await {
                return Err(FetchError::new(url, FetchErrorKind::RobotsDisallowed));
            }
            if let Some(delay) = robots.crawl_delay(&parsed).await {
                self.limiter.set_crawl_delay_floor(delay).await;
            }
        }

        let mut current = parsed;
        let mut redirects = 0usize;

        loop {
            let hop = tokio::time::timeout(
                Duration::from_secs(FETCH_TIMEOUT_SECS),
                self.attempt(&current),
            )
            .await
            .map_err(|_| {
                FetchError::new(
                    url,
                    FetchErrorKind::Timeout {
                        seconds: FETCH_TIMEOUT_SECS,
                    },
                )
            })?
            .map_err(|kind| FetchError::new(url, kind))?;

            match hop {
                Hop::Redirect(next) => {
                    redirects += 1;
                    if redirects > MAX_REDIRECTS {
                        return Err(FetchError::new(
                            url,
                            FetchErrorKind::TooManyRedirects {
                                limit: MAX_REDIRECTS,
                            },
                        ));
                    }
                    debug!(
                        target: "website_fetch::fetch",
                        "redirect {redirects}: {current} -> {next}"
                    );
                    current = next;
                }
                Hop::Page(page) => return Ok(page),
            }
        }
    }

    async fn attempt(&self, current: &Url) -> Result<Hop, FetchErrorKind> {
        let mut request = self
            .client
            .get(current.clone())
            .header(USER_AGENT, &self.user_agent);

        for (name, value) in &self.extra_headers {
            request = request.header(name, value);
        }

        if let Some(jar) = &self.cookies {
            if let Some(cookie_header) = jar.header_for(current) {
                request = request.header(COOKIE, cookie_header);
            }
        }

        let response = request.send().await.map_err(|e| FetchErrorKind::Network {
            message: e.to_string(),
        })?;

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or(FetchErrorKind::RedirectMissingLocation)?;
            let next = current.join(location).map_err(|e| FetchErrorKind::Network {
                message: format!("invalid redirect location `{location}`: {e}"),
            })?;
            return Ok(Hop::Redirect(next));
        }

        if !status.is_success() {
            return Err(FetchErrorKind::HttpStatus {
                status: status.as_u16(),
                retry_after: parse_retry_after(response.headers()),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let lowered = content_type.to_ascii_lowercase();
        if !lowered.contains("text/html") && !lowered.contains("application/xhtml+xml") {
            return Err(FetchErrorKind::NonHtmlContent { content_type });
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect::<HashMap<_, _>>();

        let html = response.text().await.map_err(|e| FetchErrorKind::Network {
            message: e.to_string(),
        })?;

        Ok(Hop::Page(FetchedPageRaw {
            url: current.to_string(),
            html,
            status: status.as_u16(),
            headers,
            fetched_at: Utc::now(),
        }))
    }
}

/// Parse a `Retry-After` header: integer seconds or an HTTP-date. Dates in
/// the past become a zero delay.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let seconds = date.signed_duration_since(Utc::now()).num_seconds().max(0);
    Some(Duration::from_secs(seconds as u64))
}
