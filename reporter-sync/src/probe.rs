//! Read-only repository queries. `fetch` is the only one with a side effect
//! and the only one that goes through the resilient runner.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use reporter_core::{BehindCount, LastCommit, RepositoryTarget};

use crate::git::{self, Git};
use crate::remote::parse_remote;
use crate::runner::Runner;
use crate::status::WorkingTreeStatus;
use crate::SyncError;

const FIELD_SEPARATOR: char = '\u{1f}';
const LAST_COMMIT_FORMAT: &str = "--format=%an%x1f%aI%x1f%h%x1f%s";

/// Resolve the working-copy root containing `dir`.
pub async fn resolve_target(
    dir: &Path,
    timeout: Option<Duration>,
) -> Result<RepositoryTarget, SyncError> {
    git::show_toplevel(dir, timeout)
        .await
        .map(RepositoryTarget::from_root)
}

#[derive(Debug, Clone)]
pub struct Probe {
    git: Git,
    runner: Arc<Runner>,
}

impl Probe {
    pub fn new(git: Git, runner: Arc<Runner>) -> Self {
        Self { git, runner }
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub async fn remote_exists(&self, remote: &str) -> Result<bool, SyncError> {
        self.git.succeeds(&["remote", "get-url", remote]).await
    }

    /// Fetch `remote` with retries. When every attempt failed and the remote
    /// locator resolves, the error names the `owner/repo` that may be gone.
    pub async fn fetch(&self, remote: &str) -> Result<(), SyncError> {
        let result = self
            .runner
            .run(|| async { self.git.run(&["fetch", remote]).await.map(|_| ()) })
            .await;
        match result {
            Err(err @ SyncError::RetriesExhausted { .. }) => Err(self.diagnose(remote, err).await),
            other => other,
        }
    }

    async fn diagnose(&self, remote: &str, exhausted: SyncError) -> SyncError {
        let locator = match self.git.run(&["remote", "get-url", remote]).await {
            Ok(out) => out.trim().to_string(),
            Err(err) => {
                tracing::debug!(error = %err, "could not read remote locator");
                return exhausted;
            }
        };
        match parse_remote(&locator) {
            Ok(parsed) => SyncError::RemoteMissing {
                owner: parsed.owner,
                repo: parsed.repo,
            },
            Err(err) => {
                tracing::debug!(%locator, error = %err, "remote locator did not resolve");
                exhausted
            }
        }
    }

    pub async fn branch_exists_locally(&self, branch: &str) -> Result<bool, SyncError> {
        let reference = format!("refs/heads/{branch}");
        self.git
            .succeeds(&["rev-parse", "--verify", "--quiet", &reference])
            .await
    }

    pub async fn branch_exists_remotely(
        &self,
        remote: &str,
        branch: &str,
    ) -> Result<bool, SyncError> {
        let reference = format!("refs/remotes/{remote}/{branch}");
        self.git
            .succeeds(&["rev-parse", "--verify", "--quiet", &reference])
            .await
    }

    /// Commits reachable from `remote/branch` but not from `branch`.
    pub async fn commits_behind(&self, branch: &str, remote: &str) -> Result<BehindCount, SyncError> {
        let range = format!("{branch}..{remote}/{branch}");
        let out = self.git.run(&["rev-list", "--count", &range]).await?;
        BehindCount::parse(&out).ok_or_else(|| SyncError::UnexpectedOutput {
            command: format!("rev-list --count {range}"),
            output: out,
        })
    }

    /// Newest commit on `remote/branch`.
    pub async fn last_commit(&self, remote: &str, branch: &str) -> Result<LastCommit, SyncError> {
        let reference = format!("{remote}/{branch}");
        let out = self
            .git
            .run(&["log", "-1", LAST_COMMIT_FORMAT, &reference])
            .await?;
        parse_last_commit(&out).ok_or_else(|| SyncError::UnexpectedOutput {
            command: format!("log -1 {reference}"),
            output: out,
        })
    }

    pub async fn status(&self) -> Result<WorkingTreeStatus, SyncError> {
        let out = self.git.run(&["status", "--porcelain"]).await?;
        Ok(WorkingTreeStatus::parse(&out))
    }
}

fn parse_last_commit(out: &str) -> Option<LastCommit> {
    let mut fields = out.trim_end_matches('\n').splitn(4, FIELD_SEPARATOR);
    let author = fields.next()?;
    let date = DateTime::parse_from_rfc3339(fields.next()?).ok()?;
    let short_hash = fields.next()?;
    let subject = fields.next()?;
    Some(LastCommit {
        author: author.to_string(),
        date,
        short_hash: short_hash.to_string(),
        subject: subject.to_string(),
    })
}
