//! Error types for reporter-sync.

use std::time::Duration;

use thiserror::Error;

/// All errors that can arise while probing or updating a repository.
#[derive(Debug, Error)]
pub enum SyncError {
    /// `git` could not be started at all.
    #[error("failed to run git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The invocation exceeded its deadline and was killed.
    #[error("git {command} timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// `git` ran and exited unsuccessfully. `code` is `-1` when the process
    /// was terminated by a signal.
    #[error("{stderr} (exit status {code})")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("circuit breaker is open")]
    CircuitOpen,

    #[error("too many requests")]
    TooManyRequests,

    #[error("Command failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<SyncError>,
    },

    #[error("The remote repository {owner}/{repo} may not exist or was deleted.")]
    RemoteMissing { owner: String, repo: String },

    /// Output that does not have the shape the query expects.
    #[error("unexpected output from git {command}: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}
