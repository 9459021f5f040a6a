//! Reporter core library: domain types, configuration, errors.
//!
//! - [`types`]: newtypes and probe results
//! - [`outcome`]: per-repository outcomes, narrative lines, partitioned report
//! - [`config`]: `.rprc` discovery, loading, and flag precedence
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod outcome;
pub mod types;

pub use config::{is_included, FileConfig, Overrides, SyncConfig};
pub use error::ConfigError;
pub use outcome::{
    AbortKind, Bucket, NarrativeLine, RepoReport, Report, SkipReason, Tone, UpdateOutcome,
    UpdateStep,
};
pub use types::{BehindCount, DriftReport, LastCommit, RepoName, RepositoryTarget};
