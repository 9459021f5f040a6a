//! Reporter: report and resolve drift across git working copies.
//!
//! # Usage
//!
//! ```text
//! rp [PATH] [--update] [--force] [--branch <B>] [--remote <R>] [--json] [--timeout <SECS>] [-v...]
//! rp [PATH] --log [--branch <B>] [--remote <R>]
//! ```

mod commands;
mod logging;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

const EXAMPLES: &str = "\
Examples:

In a Git repository:
  $ rp

  Checking Repository For Updates. git: (origin/main)

  mvp-service is 13 commits behind
  Last commit by Lois Lane Fri Nov 24 10:56:42 2023 +0100
  abc123 fix: provide db transaction context

In a directory containing multiple Git repositories:
  $ rp

  Checking Repositories For Updates. git: (origin/main)

  Outdated Repositories:

  mvp-service is 13 commits behind
  Last commit by Lois Lane Fri Nov 24 10:56:42 2023 +0100
  abc123 fix: provide db transaction context

  Up-to-Date Repositories:

  mvp-frontend is up-to-date
  mvp-tools is up-to-date

Updating a directory containing multiple Git repositories:
  $ rp -u

  Outdated Repositories:

  mvp-service is 13 commits behind
  Last commit by Lois Lane Fri Nov 24 10:56:42 2023 +0100
  abc123 fix: provide db transaction context
  :.
   Stashing local changes
   Pulling latest changes
   Applying stashed changes
   mvp-service is up-to-date

Settings are also read from the nearest .rprc file (YAML) at or above PATH:
  branch, update, include, exclude, force, remote_name, fetch_attempts, timeout_secs
";

#[derive(Parser, Debug)]
#[command(
    name = "rp",
    version,
    about = "Recursively reports and resolves drifts across multiple git repositories",
    long_about = None,
    after_help = EXAMPLES,
)]
pub struct Cli {
    /// Repository, or directory containing repositories (default: current directory).
    pub path: Option<PathBuf>,

    /// Automatically update repositories that are behind.
    #[arg(short, long)]
    pub update: bool,

    /// Forcefully abort rebase and merge conflicts to update.
    #[arg(short, long)]
    pub force: bool,

    /// Branch to check (default: main).
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Remote name (default: origin).
    #[arg(short, long)]
    pub remote: Option<String>,

    /// Show the complete list of upstream changes using git log.
    #[arg(short, long)]
    pub log: bool,

    /// Emit the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Deadline in seconds for each git invocation.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Increase log verbosity on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(commands::run(cli))
}
