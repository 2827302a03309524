//! Rate limiter adaptation and retry discipline.
//!
//! These tests inject synthetic calls instead of real HTTP and run under
//! tokio's paused clock, so every sleep completes instantly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use website_fetch::{AdaptiveRateLimiter, FetchError, FetchErrorKind};

fn status_error(status: u16, retry_after: Option<Duration>) -> FetchError {
    FetchError::new(
        "https://example.com/x",
        FetchErrorKind::HttpStatus {
            status,
            retry_after,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn delay_never_drops_below_baseline() {
    let baseline = Duration::from_millis(100);
    let limiter = AdaptiveRateLimiter::new(baseline, 2, true);

    // Long streaks of successes decay the delay, but only to the baseline.
    for _ in 0..50 {
        limiter.run(|| async { Ok::<_, FetchError>(()) }).await.unwrap();
    }
    assert_eq!(limiter.current_delay().await, baseline);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_without_retry_after_doubles_delay() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(100), 2, true);

    let result: Result<(), _> = limiter
        .run(|| async { Err(status_error(429, None)) })
        .await;
    assert_eq!(result.unwrap_err().status(), Some(429));
    assert_eq!(limiter.current_delay().await, Duration::from_millis(200));

    // A second 429 doubles the already-doubled delay.
    let _ = limiter
        .run(|| async { Err::<(), _>(status_error(429, None)) })
        .await;
    assert_eq!(limiter.current_delay().await, Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_honors_retry_after_seconds() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(100), 2, true);

    let result: Result<(), _> = limiter
        .run(|| async { Err(status_error(429, Some(Duration::from_secs(2)))) })
        .await;
    assert!(result.is_err());
    assert_eq!(limiter.current_delay().await, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn rate_limit_adaptation_can_be_disabled() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(100), 2, false);

    let _ = limiter
        .run(|| async { Err::<(), _>(status_error(429, Some(Duration::from_secs(5)))) })
        .await;
    assert_eq!(limiter.current_delay().await, Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn server_errors_retry_then_succeed() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(10), 2, true);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_in_call = Arc::clone(&attempts);
    let result = limiter
        .run(move || {
            let attempts = Arc::clone(&attempts_in_call);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status_error(503, None))
                } else {
                    Ok("payload")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "payload");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn server_errors_exhaust_retry_budget() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(10), 2, true);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_in_call = Arc::clone(&attempts);
    let result: Result<(), _> = limiter
        .run(move || {
            let attempts = Arc::clone(&attempts_in_call);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(status_error(500, None))
            }
        })
        .await;

    assert_eq!(result.unwrap_err().status(), Some(500));
    // Initial attempt plus two retries.
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn client_errors_do_not_retry() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(10), 3, true);
    let attempts = Arc::new(AtomicU32::new(0));

    let attempts_in_call = Arc::clone(&attempts);
    let result: Result<(), _> = limiter
        .run(move || {
            let attempts = Arc::clone(&attempts_in_call);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(status_error(404, None))
            }
        })
        .await;

    assert_eq!(result.unwrap_err().status(), Some(404));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn crawl_delay_floor_raises_baseline() {
    let limiter = AdaptiveRateLimiter::new(Duration::from_millis(100), 2, true);

    limiter.set_crawl_delay_floor(Duration::from_secs(1)).await;
    assert_eq!(limiter.current_delay().await, Duration::from_secs(1));

    // Success-streak decay must respect the raised floor.
    for _ in 0..30 {
        limiter.run(|| async { Ok::<_, FetchError>(()) }).await.unwrap();
    }
    assert_eq!(limiter.current_delay().await, Duration::from_secs(1));

    // A lower floor never shrinks the baseline.
    limiter.set_crawl_delay_floor(Duration::from_millis(10)).await;
    assert_eq!(limiter.current_delay().await, Duration::from_secs(1));
}
