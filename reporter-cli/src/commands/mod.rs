pub mod check;
pub mod log;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use reporter_core::{config, Overrides, SyncConfig};

use crate::Cli;

/// Resolve settings and dispatch to `--log` or the drift check.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let root = resolve_root(cli.path.as_deref())?;

    let file = config::load_nearest(&root).context("Error loading config")?;
    if let Some((path, _)) = &file {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    let config = SyncConfig::resolve(
        file.map(|(_, loaded)| loaded),
        Overrides {
            branch: cli.branch.clone(),
            remote_name: cli.remote.clone(),
            update: cli.update,
            force: cli.force,
            timeout_secs: cli.timeout,
        },
    );

    if cli.log {
        return log::run(&root, &config).await;
    }
    check::run(&root, config, cli.json).await
}

/// Absolute, canonical form of PATH (default: the working directory), so that
/// `.` and `..` are named after the directory they point at. A path that
/// cannot be canonicalized is kept as given and rejected by discovery.
fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Error getting current directory")?;
    let root = match path {
        Some(path) => cwd.join(path),
        None => cwd,
    };
    Ok(fs::canonicalize(&root).unwrap_or(root))
}
