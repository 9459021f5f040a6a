//! Shared, read-only state handed to every repository unit.

use std::sync::Arc;

use reporter_core::SyncConfig;

use crate::breaker::CircuitBreaker;
use crate::runner::{RetryPolicy, Runner};

#[derive(Debug, Clone)]
pub struct SyncContext {
    pub config: Arc<SyncConfig>,
    pub runner: Arc<Runner>,
}

impl SyncContext {
    /// Context with a fresh process-wide breaker and a retry policy taken
    /// from `config`.
    pub fn new(config: SyncConfig) -> Self {
        let policy = RetryPolicy::with_attempts(config.fetch_attempts);
        Self::with_runner(config, Runner::new(Arc::new(CircuitBreaker::default()), policy))
    }

    pub fn with_runner(config: SyncConfig, runner: Runner) -> Self {
        Self {
            config: Arc::new(config),
            runner: Arc::new(runner),
        }
    }
}
