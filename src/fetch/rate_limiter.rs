//! Adaptive request pacing with retry discipline.
//!
//! Every outgoing call sleeps the current delay first, then runs with a
//! bounded retry budget. Server pushback reshapes future delays: 5xx
//! responses retry with exponential backoff, 429 responses grow the delay
//! (honoring `Retry-After` when present) and propagate, and a streak of
//! successes decays the delay back toward the baseline.
//!
//! Instance-based with isolated state so tests can run in parallel.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::FetchError;
use crate::utils::constants::RATE_LIMIT_SUCCESS_STREAK;

struct LimiterState {
    base_delay: Duration,
    current_delay: Duration,
    success_streak: u32,
}

pub struct AdaptiveRateLimiter {
    state: Mutex<LimiterState>,
    max_retries: u32,
    adaptive: bool,
}

impl AdaptiveRateLimiter {
    /// `base_delay` is the floor the delay decays back to; `max_retries`
    /// bounds 5xx retries on top of the initial attempt; `adaptive` gates
    /// all delay reshaping.
    #[must_use]
    pub fn new(base_delay: Duration, max_retries: u32, adaptive: bool) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                base_delay,
                current_delay: base_delay,
                success_streak: 0,
            }),
            max_retries,
            adaptive,
        }
    }

    /// Raise the baseline (and the current delay, if below) to `floor`.
    ///
    /// Used to honor a robots.txt `Crawl-delay` that exceeds the configured
    /// delay.
    pub async fn set_crawl_delay_floor(&self, floor: Duration) {
        let mut state = self.state.lock().await;
        if floor > state.base_delay {
            debug!(
                target: "website_fetch::rate_limit",
                "raising delay floor from {:?} to {floor:?}",
                state.base_delay
            );
            state.base_delay = floor;
        }
        if state.current_delay < state.base_delay {
            state.current_delay = state.base_delay;
        }
    }

    /// Current delay applied before the next call.
    pub async fn current_delay(&self) -> Duration {
        self.state.lock().await.current_delay
    }

    /// Sleep the current delay, then run `call` with the retry discipline.
    ///
    /// 5xx failures zero the success streak and retry after
    /// `delay × 2^(attempt+1)`, up to the retry budget. A 429 zeroes the
    /// streak, reshapes the delay (when adaptive), and propagates. Any
    /// other failure propagates immediately.
    pub async fn run<T, F, Fut>(&self, call: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let delay = self.current_delay().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        for attempt in 0..=self.max_retries {
            match call().await {
                Ok(value) => {
                    self.on_success().await;
                    return Ok(value);
                }
                Err(err) if err.is_server_error() => {
                    self.zero_streak().await;
                    if attempt == self.max_retries {
                        return Err(err);
                    }
                    let backoff = delay.saturating_mul(1u32 << (attempt + 1));
                    debug!(
                        target: "website_fetch::rate_limit",
                        "{} answered {}; retrying in {backoff:?} (attempt {})",
                        err.url,
                        err.status().unwrap_or(0),
                        attempt + 1
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(err) if err.is_rate_limited() => {
                    self.on_rate_limited(err.retry_after()).await;
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }

        unreachable!("retry loop always returns on the final attempt");
    }

    async fn on_success(&self) {
        let mut state = self.state.lock().await;
        state.success_streak += 1;
        if self.adaptive && state.success_streak >= RATE_LIMIT_SUCCESS_STREAK {
            let decayed = state.current_delay.mul_f64(0.8);
            state.current_delay = decayed.max(state.base_delay);
            state.success_streak = 0;
        }
    }

    async fn zero_streak(&self) {
        self.state.lock().await.success_streak = 0;
    }

    async fn on_rate_limited(&self, retry_after: Option<Duration>) {
        let mut state = self.state.lock().await;
        state.success_streak = 0;
        if !self.adaptive {
            return;
        }
        let new_delay = match retry_after {
            Some(server_delay) => server_delay.max(state.base_delay),
            None => state.current_delay.saturating_mul(2),
        };
        debug!(
            target: "website_fetch::rate_limit",
            "rate limited; delay {:?} -> {new_delay:?}",
            state.current_delay
        );
        state.current_delay = new_delay;
    }
}
