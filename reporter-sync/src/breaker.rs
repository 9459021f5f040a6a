//! Process-wide circuit breaker guarding remote git operations.
//!
//! # States
//!
//! - `Closed`: calls pass. Counters are cleared every `interval`. The breaker
//!   trips to `Open` once consecutive failures exceed `failure_threshold`.
//! - `Open`: calls are rejected with [`SyncError::CircuitOpen`] until
//!   `open_timeout` has elapsed, then the breaker becomes `HalfOpen`.
//! - `HalfOpen`: at most `max_half_open_requests` calls are admitted. Any
//!   failure re-opens; that many consecutive successes close it.
//!
//! Every state change starts a new generation. A call that finishes after
//! the generation it started in has ended does not touch the counters.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub max_half_open_requests: u32,
    pub interval: Duration,
    pub open_timeout: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            max_half_open_requests: 5,
            interval: Duration::from_secs(60),
            open_timeout: Duration::from_secs(60),
        }
    }
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub opened_at: Option<Instant>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counts {
    requests: u32,
    consecutive_successes: u32,
    consecutive_failures: u32,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    generation: u64,
    counts: Counts,
    expiry: Option<Instant>,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    settings: BreakerSettings,
    inner: Mutex<Inner>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerSettings::default())
    }
}

impl CircuitBreaker {
    pub fn new(settings: BreakerSettings) -> Self {
        let mut inner = Inner {
            state: BreakerState::Closed,
            generation: 0,
            counts: Counts::default(),
            expiry: None,
            opened_at: None,
        };
        new_generation(&mut inner, &settings, Instant::now());
        Self {
            settings,
            inner: Mutex::new(inner),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.snapshot().state
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        self.refresh(&mut inner, Instant::now());
        CircuitSnapshot {
            state: inner.state,
            consecutive_failures: inner.counts.consecutive_failures,
            opened_at: inner.opened_at,
        }
    }

    /// Run `f` if the breaker admits it and record its outcome.
    pub async fn call<T, F, Fut>(&self, f: F) -> Result<T, SyncError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let generation = self.before_call()?;
        let result = f().await;
        self.after_call(generation, result.is_ok());
        result
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn before_call(&self) -> Result<u64, SyncError> {
        let mut inner = self.lock();
        self.refresh(&mut inner, Instant::now());
        match inner.state {
            BreakerState::Open => return Err(SyncError::CircuitOpen),
            BreakerState::HalfOpen
                if inner.counts.requests >= self.settings.max_half_open_requests =>
            {
                return Err(SyncError::TooManyRequests)
            }
            _ => {}
        }
        inner.counts.requests += 1;
        Ok(inner.generation)
    }

    fn after_call(&self, generation: u64, success: bool) {
        let now = Instant::now();
        let mut inner = self.lock();
        self.refresh(&mut inner, now);
        if inner.generation != generation {
            tracing::debug!(generation, current = inner.generation, "ignoring outcome from stale breaker generation");
            return;
        }

        if success {
            inner.counts.consecutive_successes += 1;
            inner.counts.consecutive_failures = 0;
            if inner.state == BreakerState::HalfOpen
                && inner.counts.consecutive_successes >= self.settings.max_half_open_requests
            {
                self.transition(&mut inner, BreakerState::Closed, now);
            }
        } else {
            inner.counts.consecutive_failures += 1;
            inner.counts.consecutive_successes = 0;
            let trip = match inner.state {
                BreakerState::Closed => {
                    inner.counts.consecutive_failures > self.settings.failure_threshold
                }
                BreakerState::HalfOpen => true,
                BreakerState::Open => false,
            };
            if trip {
                self.transition(&mut inner, BreakerState::Open, now);
            }
        }
    }

    /// Apply time-driven changes: counter reset while closed, cool-down
    /// expiry while open.
    fn refresh(&self, inner: &mut Inner, now: Instant) {
        let expired = inner.expiry.is_some_and(|expiry| expiry <= now);
        match inner.state {
            BreakerState::Closed if expired => new_generation(inner, &self.settings, now),
            BreakerState::Open if expired => self.transition(inner, BreakerState::HalfOpen, now),
            _ => {}
        }
    }

    fn transition(&self, inner: &mut Inner, to: BreakerState, now: Instant) {
        if inner.state == to {
            return;
        }
        let from = inner.state;
        inner.state = to;
        match to {
            BreakerState::Open => inner.opened_at = Some(now),
            BreakerState::Closed => inner.opened_at = None,
            BreakerState::HalfOpen => {}
        }
        new_generation(inner, &self.settings, now);
        tracing::info!(?from, ?to, "circuit breaker state changed");
    }
}

fn new_generation(inner: &mut Inner, settings: &BreakerSettings, now: Instant) {
    inner.generation += 1;
    inner.counts = Counts::default();
    inner.expiry = match inner.state {
        BreakerState::Closed if settings.interval.is_zero() => None,
        BreakerState::Closed => Some(now + settings.interval),
        BreakerState::Open => Some(now + settings.open_timeout),
        BreakerState::HalfOpen => None,
    };
}
