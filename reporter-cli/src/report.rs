//! Report rendering: colored text for terminals, JSON for tools.
//!
//! Text layout for a directory of repositories:
//!
//! ```text
//!
//! Checking Repositories For Updates. git: (origin/main)
//! <diagnostics, verbatim>
//!
//! Outdated Repositories:
//!
//! <narrative per repository, each preceded by a blank line>
//!
//! Up-to-Date Repositories:
//!
//! <one line per repository>
//! ```
//!
//! A single repository gets its header followed by its narrative only.

use std::io::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use reporter_core::{NarrativeLine, RepoReport, Report, SyncConfig, Tone};

pub fn header(single: bool, config: &SyncConfig) -> String {
    let subject = if single { "Repository" } else { "Repositories" };
    format!(
        "Checking {subject} For Updates. git: ({}/{})",
        config.remote_name, config.branch
    )
}

fn styled(line: &NarrativeLine) -> String {
    match line.tone {
        Tone::Alert => line.text.bright_red().to_string(),
        Tone::Success => line.text.bright_green().to_string(),
        Tone::Plain => line.text.clone(),
    }
}

fn write_repo(out: &mut impl Write, repo: &RepoReport) -> io::Result<()> {
    for line in repo.narrative() {
        writeln!(out, "{}", styled(&line))?;
    }
    Ok(())
}

pub fn write_text(
    out: &mut impl Write,
    header: &str,
    report: &Report,
    single: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{header}")?;

    for repo in &report.diagnostics {
        write_repo(out, repo)?;
    }

    if single {
        for repo in &report.outdated {
            writeln!(out)?;
            write_repo(out, repo)?;
        }
        for repo in &report.up_to_date {
            write_repo(out, repo)?;
        }
        return Ok(());
    }

    if !report.outdated.is_empty() {
        writeln!(out)?;
        writeln!(out, "Outdated Repositories:")?;
        for repo in &report.outdated {
            writeln!(out)?;
            write_repo(out, repo)?;
        }
        writeln!(out)?;
    }

    if !report.up_to_date.is_empty() {
        writeln!(out, "Up-to-Date Repositories:")?;
        writeln!(out)?;
        for repo in &report.up_to_date {
            write_repo(out, repo)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    header: &'a str,
    remote: &'a str,
    branch: &'a str,
    #[serde(flatten)]
    report: &'a Report,
}

pub fn write_json(
    out: &mut impl Write,
    header: &str,
    config: &SyncConfig,
    report: &Report,
) -> Result<()> {
    let payload = JsonReport {
        header,
        remote: &config.remote_name,
        branch: &config.branch,
        report,
    };
    serde_json::to_writer_pretty(&mut *out, &payload).context("failed to serialize report JSON")?;
    writeln!(out)?;
    Ok(())
}
