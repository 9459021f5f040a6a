//! # reporter-sync
//!
//! Drift detection and safe update for git working copies.
//!
//! Call [`check_all`] to check a set of candidate directories concurrently,
//! or [`check_repository`] for a single one. Every git invocation goes through
//! [`git::Git`]; remote fetches additionally go through the shared
//! [`runner::Runner`] and its [`breaker::CircuitBreaker`].

pub mod breaker;
pub mod context;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod probe;
pub mod remote;
pub mod runner;
pub mod sequencer;
pub mod stash;
pub mod status;

pub use breaker::{BreakerSettings, BreakerState, CircuitBreaker, CircuitSnapshot};
pub use context::SyncContext;
pub use error::SyncError;
pub use orchestrator::{check_all, filter_candidates};
pub use remote::{parse_remote, RemoteError, RemoteRef};
pub use runner::{RetryPolicy, Runner};
pub use sequencer::{check_repository, Phase};
pub use status::{classify, ConflictState, WorkingTreeStatus};
