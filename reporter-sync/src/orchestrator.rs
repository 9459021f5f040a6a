//! Concurrent fan-out over candidate directories.
//!
//! One task per included directory, each publishing exactly one
//! [`RepoReport`] on a channel sized to the number of tasks. All tasks are
//! joined before the channel is drained and partitioned.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use reporter_core::{RepoName, RepoReport, Report, UpdateOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::sequencer::check_repository;
use crate::SyncContext;

/// Directories whose final path segment passes the include/exclude policy.
pub fn filter_candidates(candidates: Vec<PathBuf>, ctx: &SyncContext) -> Vec<PathBuf> {
    candidates
        .into_iter()
        .filter(|dir| {
            let name = candidate_name(dir);
            let keep = ctx.config.includes(name.as_str());
            if !keep {
                tracing::debug!(%name, "filtered out by include/exclude");
            }
            keep
        })
        .collect()
}

/// Name used by the include/exclude policy. A path ending in `..` has no
/// final segment of its own, so it is named after the directory it resolves to.
fn candidate_name(dir: &Path) -> RepoName {
    if dir.file_name().is_some() {
        return RepoName::from_path(dir);
    }
    match std::fs::canonicalize(dir) {
        Ok(resolved) => RepoName::from_path(&resolved),
        Err(_) => RepoName::from_path(dir),
    }
}

/// Check every included candidate concurrently and partition the results.
///
/// Dropping the returned future aborts all in-flight units.
pub async fn check_all(candidates: Vec<PathBuf>, ctx: &SyncContext) -> Report {
    let candidates = filter_candidates(candidates, ctx);
    let (tx, mut rx) = mpsc::channel::<(PathBuf, RepoReport)>(candidates.len().max(1));
    let mut units = JoinSet::new();

    for dir in &candidates {
        let dir = dir.clone();
        let ctx = ctx.clone();
        let tx = tx.clone();
        let span = tracing::info_span!("repo", name = %candidate_name(&dir));
        units.spawn(
            async move {
                let report = check_repository(&dir, &ctx).await;
                tracing::info!(bucket = ?report.bucket(), "repository checked");
                if tx.send((dir, report)).await.is_err() {
                    tracing::warn!("report channel closed before publishing");
                }
            }
            .instrument(span),
        );
    }
    drop(tx);

    while let Some(joined) = units.join_next().await {
        if let Err(err) = joined {
            tracing::error!(error = %err, "repository unit did not complete");
        }
    }

    let mut published = HashSet::new();
    let mut messages = Vec::with_capacity(candidates.len());
    while let Some((dir, report)) = rx.recv().await {
        published.insert(dir);
        messages.push(report);
    }

    // A unit that panicked published nothing; report it instead of dropping it.
    for dir in candidates {
        if published.contains(&dir) {
            continue;
        }
        messages.push(RepoReport {
            name: candidate_name(&dir),
            outcome: UpdateOutcome::failed(format!(
                "Error checking {}: task ended without a report",
                dir.display()
            )),
            path: dir,
        });
    }

    Report::partition(messages)
}
