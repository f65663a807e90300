//! Retry with Exponential Backoff
//!
//! One retry utility for every upstream call, parameterized by attempt
//! count and delay bounds. Transiency is decided by the error itself
//! (`WikiError::is_transient`); parse errors get exactly one extra attempt
//! before being treated as permanent.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::constants::network;
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubled per attempt
    pub base_delay: Duration,
    /// Upper bound on the computed delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: network::MAX_RETRIES,
            base_delay: Duration::from_millis(network::BASE_DELAY_MS),
            max_delay: Duration::from_secs(network::MAX_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(network::MAX_DELAY_SECS),
        }
    }

    /// Backoff for the given retry (1-based): `base * 2^(n-1)` capped at
    /// `max_delay`, plus up to 25% random jitter to spread synchronized
    /// clients apart.
    fn delay_for(&self, retry: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << retry.saturating_sub(1).min(16));
        let capped = exp.min(self.max_delay);
        let jitter_ms = capped.as_millis() as u64 / 4;
        let jitter = if jitter_ms > 0 {
            rand::rng().random_range(0..=jitter_ms)
        } else {
            0
        };
        capped + Duration::from_millis(jitter)
    }

    /// Run `f` until it succeeds, a permanent error occurs, or the
    /// attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        let mut parse_retried = false;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_parse() => {
                    if parse_retried {
                        return Err(err);
                    }
                    parse_retried = true;
                    warn!(operation, error = %err, "parse failure, retrying once");
                    sleep(self.base_delay).await;
                }
                Err(err) if err.is_transient() && retries + 1 < self.max_attempts => {
                    retries += 1;
                    let delay = self.delay_for(retries);
                    debug!(
                        operation,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off"
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn status_error(status: u16) -> WikiError {
        WikiError::Status {
            status,
            url: "https://fr.wikipedia.org/w/api.php".into(),
        }
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let result = policy
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, WikiError>(7)
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let result = policy
            .run("op", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status_error(503))
                } else {
                    Ok(42)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(status_error(429))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_fails_fast() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(status_error(404))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_parse_error_retried_exactly_once() {
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let calls = AtomicU32::new(0);
        let result: Result<u32> = policy
            .run("op", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(WikiError::shape("bad shape"))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(30),
        };
        // 10s * 2^9 far exceeds the cap; jitter adds at most 25%
        assert!(policy.delay_for(10) <= Duration::from_millis(37_500));
    }
}
