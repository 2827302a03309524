//! Bounded-concurrency queue over the rate limiter.
//!
//! Every network job in a crawl flows through one queue: a semaphore caps
//! requests in flight globally, and beneath each permit the rate limiter
//! applies its sleep-then-call discipline.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

use crate::error::FetchError;
use crate::fetch::rate_limiter::AdaptiveRateLimiter;

pub struct FetchQueue {
    semaphore: Arc<Semaphore>,
    limiter: Arc<AdaptiveRateLimiter>,
    pending: AtomicUsize,
    idle: Notify,
}

impl FetchQueue {
    #[must_use]
    pub fn new(concurrency: usize, limiter: Arc<AdaptiveRateLimiter>) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            limiter,
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    #[must_use]
    pub fn limiter(&self) -> &Arc<AdaptiveRateLimiter> {
        &self.limiter
    }

    /// Run `job` under the concurrency cap and the per-call delay.
    pub async fn run<T, F, Fut>(&self, job: F) -> Result<T, FetchError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.pending.fetch_add(1, Ordering::AcqRel);

        // The semaphore is never closed, so acquire only fails if the
        // queue itself was dropped mid-call, which cannot happen while a
        // caller borrows it.
        let _permit = self
            .semaphore
            .acquire()
            .await
            .expect("fetch queue semaphore closed");

        let result = self.limiter.run(job).await;

        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }

        result
    }

    /// Wait until no submitted jobs remain pending.
    pub async fn on_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
