//! Single place where `git` child processes are spawned.
//!
//! Every invocation runs as `git -C <root> ...` with a fixed locale and with
//! terminal prompts disabled, so output is parseable and a missing credential
//! fails fast instead of hanging the unit. Children are killed when the
//! awaiting future is dropped.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::SyncError;

const GIT_ENV: &[(&str, &str)] = &[("LC_ALL", "C"), ("GIT_TERMINAL_PROMPT", "0")];

/// Handle for running git against one working copy.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
    timeout: Option<Duration>,
}

impl Git {
    pub fn new(root: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Run `git <args>` and return its stdout. A non-zero exit becomes
    /// [`SyncError::CommandFailed`] carrying the trimmed stderr.
    pub async fn run(&self, args: &[&str]) -> Result<String, SyncError> {
        let command = args.join(" ");
        let mut cmd = self.command(args);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(%command, timeout_secs = limit.as_secs(), "git invocation timed out");
                    return Err(SyncError::Timeout {
                        command,
                        timeout: limit,
                    });
                }
            },
            None => cmd.output().await,
        }
        .map_err(|source| SyncError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(%command, code = ?output.status.code(), %stderr, "git exited unsuccessfully");
            return Err(SyncError::CommandFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `Ok(false)` when git ran and exited non-zero; spawn and timeout
    /// failures still propagate.
    pub async fn succeeds(&self, args: &[&str]) -> Result<bool, SyncError> {
        match self.run(args).await {
            Ok(_) => Ok(true),
            Err(SyncError::CommandFailed { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Run `git <args>` with stdout and stderr inherited from this process.
    /// No deadline applies; the user is watching the output.
    pub async fn stream(&self, args: &[&str]) -> Result<(), SyncError> {
        let command = args.join(" ");
        let status = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| SyncError::Spawn {
                command: command.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(SyncError::CommandFailed {
                command,
                code: status.code().unwrap_or(-1),
                stderr: String::new(),
            })
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.root).args(args).kill_on_drop(true);
        for (key, value) in GIT_ENV {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Top-level directory of the working copy containing `dir`.
pub async fn show_toplevel(dir: &Path, timeout: Option<Duration>) -> Result<PathBuf, SyncError> {
    let stdout = Git::new(dir, timeout)
        .run(&["rev-parse", "--show-toplevel"])
        .await?;
    let root = stdout.trim();
    if root.is_empty() {
        return Err(SyncError::UnexpectedOutput {
            command: "rev-parse --show-toplevel".to_string(),
            output: stdout,
        });
    }
    Ok(PathBuf::from(root))
}
