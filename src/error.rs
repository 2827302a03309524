//! Error types shared across the crawl pipeline.
//!
//! Per-page failures (`FetchError`, `ConversionError`) are recovered at the
//! crawler and recorded as skipped pages. LLM failures (`LlmError`) are
//! recovered at the call site with a per-layer fallback. `ConfigError` is
//! fatal before any work begins.

use std::time::Duration;
use thiserror::Error;

/// The reason a fetch failed.
#[derive(Debug, Error)]
pub enum FetchErrorKind {
    /// The URL is disallowed for our user agent by the origin's robots.txt.
    #[error("disallowed by robots.txt")]
    RobotsDisallowed,

    /// The redirect chain exceeded the redirect limit.
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    /// The request did not complete within the per-attempt timeout.
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP status {status}")]
    HttpStatus {
        status: u16,
        /// Parsed `Retry-After` header, when the server sent one.
        retry_after: Option<Duration>,
    },

    /// The response body is not HTML.
    #[error("response is not HTML (content-type: {content_type})")]
    NonHtmlContent { content_type: String },

    /// Connection, DNS, TLS, or any other transport-level failure.
    #[error("network error: {message}")]
    Network { message: String },

    /// A 3xx response arrived without a `Location` header.
    #[error("redirect response without a Location header")]
    RedirectMissingLocation,
}

/// A failed fetch, carrying the originally requested URL.
///
/// The URL here is the one the caller asked for; redirects may have moved
/// the request elsewhere before it failed.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {kind}")]
pub struct FetchError {
    pub url: String,
    pub kind: FetchErrorKind,
}

impl FetchError {
    #[must_use]
    pub fn new(url: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    /// HTTP status code, when the failure carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FetchErrorKind::HttpStatus { status, .. } => Some(status),
            _ => None,
        }
    }

    /// Whether this is a 5xx response, worth retrying with backoff.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if (500..=599).contains(&status))
    }

    /// Whether the server asked us to slow down.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Parsed `Retry-After` value from a 429/503 response, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self.kind {
            FetchErrorKind::HttpStatus { retry_after, .. } => retry_after,
            _ => None,
        }
    }
}

/// Failure raised by a caller-supplied custom conversion function.
///
/// The built-in strategies are total over their input; only the custom
/// strategy can fail, and its error propagates unchanged.
#[derive(Debug, Error)]
#[error("conversion failed for {url}: {message}")]
pub struct ConversionError {
    pub url: String,
    pub message: String,
}

impl ConversionError {
    #[must_use]
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Any failure of an LLM invocation, including timeouts and malformed
/// structured output. Tagged with the call site that issued the request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM call `{site}` timed out after {seconds}s")]
    Timeout { site: String, seconds: u64 },

    #[error("LLM call `{site}` failed: {message}")]
    Invocation { site: String, message: String },

    #[error("LLM call `{site}` returned malformed output: {message}")]
    Malformed { site: String, message: String },
}

/// Configuration problems detected before any crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("start URL `{0}` is not a valid http(s) URL")]
    InvalidUrl(String),

    #[error("{mode} mode requires a crawl description")]
    MissingDescription { mode: String },

    #[error("conversion strategy `custom` requires a custom converter")]
    MissingCustomConverter,

    #[error("agent mode requires an LLM provider")]
    MissingLlmProvider,

    #[error("invalid glob pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to read cookie file {path}: {message}")]
    CookieFile { path: String, message: String },

    #[error("failed to initialize HTTP client: {0}")]
    HttpClient(String),
}
