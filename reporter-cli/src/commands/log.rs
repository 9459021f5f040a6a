//! `rp --log`: stream the upstream commits the local branch is missing.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use reporter_core::SyncConfig;
use reporter_detector::is_git_repository;
use reporter_sync::git::Git;

pub async fn run(root: &Path, config: &SyncConfig) -> Result<ExitCode> {
    if !is_git_repository(root) {
        bail!("{} is not a Git repository", root.display());
    }
    let range = format!("{0}..{1}/{0}", config.branch, config.remote_name);
    Git::new(root, None)
        .stream(&["log", &range])
        .await
        .context("Error running git log")?;
    Ok(ExitCode::SUCCESS)
}
