//! Stash contract: the sequencer pops only the stash it created itself.
//!
//! A stash is ours when it is the newest entry, its commit is the one this
//! run created, and its label is exactly `On <branch>: Stashed by reporter`.

use crate::git::Git;
use crate::SyncError;

pub const STASH_MESSAGE: &str = "Stashed by reporter";

const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub oid: String,
    pub label: String,
}

/// Label git gives a stash pushed with [`STASH_MESSAGE`] while on `branch`.
pub fn stash_label(branch: &str) -> String {
    format!("On {branch}: {STASH_MESSAGE}")
}

/// Newest stash entry, if any.
pub async fn top(git: &Git) -> Result<Option<StashEntry>, SyncError> {
    let out = git
        .run(&["stash", "list", "--max-count=1", "--format=%H%x1f%gs"])
        .await?;
    let line = out.trim_end_matches('\n');
    if line.is_empty() {
        return Ok(None);
    }
    let Some((oid, label)) = line.split_once(FIELD_SEPARATOR) else {
        return Err(SyncError::UnexpectedOutput {
            command: "stash list".to_string(),
            output: out,
        });
    };
    Ok(Some(StashEntry {
        oid: oid.to_string(),
        label: label.to_string(),
    }))
}

/// Stash local changes with the marker label. Returns the new stash commit,
/// or `None` when git had nothing to stash.
pub async fn push(git: &Git) -> Result<Option<String>, SyncError> {
    let before = top(git).await?;
    git.run(&["stash", "push", "-m", STASH_MESSAGE]).await?;
    let after = top(git).await?;
    Ok(match (before, after) {
        (Some(before), Some(after)) if before.oid == after.oid => None,
        (_, after) => after.map(|entry| entry.oid),
    })
}

/// `true` when `entry` is the stash this run created against `branch`.
pub fn is_own(entry: &StashEntry, created: &str, branch: &str) -> bool {
    entry.oid == created && entry.label == stash_label(branch)
}

/// Pop the newest stash. Callers check [`is_own`] first.
pub async fn pop(git: &Git) -> Result<(), SyncError> {
    git.run(&["stash", "pop"]).await.map(|_| ())
}
