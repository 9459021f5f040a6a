//! Default command: check candidates for drift and optionally update them.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use reporter_core::SyncConfig;
use reporter_detector::discover;
use reporter_sync::{check_all, SyncContext};

use crate::report;

/// Exit status after Ctrl-C, as a shell reports SIGINT.
const INTERRUPTED: u8 = 130;

pub async fn run(root: &Path, config: SyncConfig, json: bool) -> Result<ExitCode> {
    let discovery = discover(root).context("Error reading directory")?;
    let single = discovery.is_single();
    let header = report::header(single, &config);
    let ctx = SyncContext::new(config);

    tracing::info!(candidates = discovery.candidates().len(), "checking repositories");
    let report = tokio::select! {
        report = check_all(discovery.candidates().to_vec(), &ctx) => report,
        Ok(()) = tokio::signal::ctrl_c() => {
            eprintln!("Interrupted; in-flight git commands were stopped.");
            return Ok(ExitCode::from(INTERRUPTED));
        }
    };

    let stdout = std::io::stdout();
    if !stdout.is_terminal() {
        colored::control::set_override(false);
    }
    let mut out = stdout.lock();
    if json {
        report::write_json(&mut out, &header, &ctx.config, &report)?;
    } else if single && report.is_empty() {
        // The only candidate was filtered out by include/exclude.
        tracing::info!("repository excluded by configuration");
    } else {
        report::write_text(&mut out, &header, &report, single)?;
    }
    out.flush().context("failed to flush report")?;
    Ok(ExitCode::SUCCESS)
}
