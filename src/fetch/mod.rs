//! The fetch pipeline: rate limiting, bounded concurrency, and the HTTP
//! fetcher itself.

pub mod fetcher;
pub mod queue;
pub mod rate_limiter;

pub use fetcher::HttpFetcher;
pub use queue::FetchQueue;
pub use rate_limiter::AdaptiveRateLimiter;
