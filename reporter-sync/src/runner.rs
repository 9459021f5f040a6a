//! Resilient runner: bounded retries with capped exponential backoff and
//! jitter, all behind the shared [`CircuitBreaker`].
//!
//! The breaker sees one call per retried operation, so a repository that
//! exhausts its attempts counts as a single failure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::breaker::CircuitBreaker;
use crate::SyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound (exclusive) of the uniform jitter added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: reporter_core::config::DEFAULT_FETCH_ATTEMPTS,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(10),
            max_jitter: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// `base * 2^attempt`, capped at `max_delay`. Attempts count from 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..max))
    }
}

#[derive(Debug)]
pub struct Runner {
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
}

impl Runner {
    pub fn new(breaker: Arc<CircuitBreaker>, policy: RetryPolicy) -> Self {
        Self { breaker, policy }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Run `op` until it succeeds or the attempts are used up. An open
    /// breaker rejects the whole operation without invoking `op`.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        self.breaker.call(|| self.retry(op)).await
    }

    async fn retry<T, F, Fut>(&self, mut op: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.policy.max_attempts => {
                    tracing::warn!(attempts = attempt, error = %err, "giving up after retries");
                    return Err(SyncError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    let delay = self.policy.backoff(attempt) + self.policy.jitter();
                    tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
