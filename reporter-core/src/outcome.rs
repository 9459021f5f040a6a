//! Per-repository outcomes and the partitioned report.
//!
//! An [`UpdateOutcome`] carries everything needed to place a repository in
//! the report: the bucket and the narrative are derived from the outcome
//! alone, never by re-inspecting the repository.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{DriftReport, RepoName};

// ---------------------------------------------------------------------------
// Steps and outcomes
// ---------------------------------------------------------------------------

/// Which in-progress operation a forced update aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortKind {
    Rebase,
    Merge,
}

/// A mutation performed (or deliberately skipped) by the update sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum UpdateStep {
    ForcedAbort { kind: AbortKind },
    Stashed,
    Pulled,
    StashReapplied,
    /// The run created a stash that was no longer eligible for reapplying.
    StashKept,
    /// No stash created by this run sits on top of the stash list.
    NoStashToReapply,
}

impl UpdateStep {
    /// Report line for this step, if it is narrated at all.
    pub fn narrative(&self) -> Option<NarrativeLine> {
        let (tone, text) = match self {
            UpdateStep::ForcedAbort { .. } => (Tone::Alert, " Forcing update..."),
            UpdateStep::Stashed => (Tone::Plain, " Stashing local changes"),
            UpdateStep::Pulled => (Tone::Plain, " Pulling latest changes"),
            UpdateStep::StashReapplied => (Tone::Plain, " Applying stashed changes"),
            UpdateStep::StashKept => (
                Tone::Alert,
                " Local changes remain stashed (see git stash list)",
            ),
            UpdateStep::NoStashToReapply => return None,
        };
        Some(NarrativeLine::new(tone, text))
    }
}

/// Why processing stopped early without counting as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NoRemote { remote: String },
    NoLocalBranch { branch: String },
    NoRemoteBranch { branch: String },
}

/// Terminal classification of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpdateOutcome {
    UpToDate,
    Diverged {
        drift: DriftReport,
    },
    DivergedAndUpdated {
        drift: DriftReport,
        steps: Vec<UpdateStep>,
    },
    Skipped {
        skip: SkipReason,
    },
    /// `drift` and `steps` hold the progress narrated before the failure.
    Failed {
        drift: Option<DriftReport>,
        steps: Vec<UpdateStep>,
        reason: String,
    },
}

impl UpdateOutcome {
    /// Failure without any narrated progress.
    pub fn failed(reason: impl Into<String>) -> Self {
        UpdateOutcome::Failed {
            drift: None,
            steps: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            UpdateOutcome::UpToDate => Bucket::UpToDate,
            UpdateOutcome::Diverged { .. }
            | UpdateOutcome::DivergedAndUpdated { .. }
            | UpdateOutcome::Failed { .. } => Bucket::Outdated,
            UpdateOutcome::Skipped { .. } => Bucket::Diagnostic,
        }
    }

    pub fn drift(&self) -> Option<&DriftReport> {
        match self {
            UpdateOutcome::Diverged { drift } | UpdateOutcome::DivergedAndUpdated { drift, .. } => {
                Some(drift)
            }
            UpdateOutcome::Failed { drift, .. } => drift.as_ref(),
            UpdateOutcome::UpToDate | UpdateOutcome::Skipped { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

/// Style marker attached to every report line. The CLI maps it to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Alert,
    Success,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeLine {
    pub tone: Tone,
    pub text: String,
}

impl NarrativeLine {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

/// Report section a repository lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Outdated,
    UpToDate,
    Diagnostic,
}

/// The single message a repository unit publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoReport {
    pub name: RepoName,
    pub path: PathBuf,
    pub outcome: UpdateOutcome,
}

impl RepoReport {
    pub fn bucket(&self) -> Bucket {
        self.outcome.bucket()
    }

    pub fn narrative(&self) -> Vec<NarrativeLine> {
        let mut lines = Vec::new();
        match &self.outcome {
            UpdateOutcome::UpToDate => {
                lines.push(NarrativeLine::new(
                    Tone::Success,
                    format!("{} is up-to-date", self.name),
                ));
            }
            UpdateOutcome::Diverged { drift } => push_drift(&mut lines, drift),
            UpdateOutcome::DivergedAndUpdated { drift, steps } => {
                push_drift(&mut lines, drift);
                push_steps(&mut lines, steps);
                lines.push(NarrativeLine::new(
                    Tone::Success,
                    format!(" {} is up-to-date", self.name),
                ));
            }
            UpdateOutcome::Skipped { skip } => {
                lines.push(NarrativeLine::new(Tone::Plain, self.skip_text(skip)));
            }
            UpdateOutcome::Failed {
                drift,
                steps,
                reason,
            } => {
                if let Some(drift) = drift {
                    push_drift(&mut lines, drift);
                    push_steps(&mut lines, steps);
                }
                lines.push(NarrativeLine::new(Tone::Alert, reason.clone()));
            }
        }
        lines
    }

    fn skip_text(&self, skip: &SkipReason) -> String {
        match skip {
            SkipReason::NoRemote { remote } => {
                format!("No remote named '{remote}' found for {}", self.name)
            }
            SkipReason::NoLocalBranch { branch } => {
                format!("Branch {branch} does not exist in repository {}", self.name)
            }
            SkipReason::NoRemoteBranch { branch } => {
                format!(
                    "Remote branch {branch} does not exist in repository {}",
                    self.name
                )
            }
        }
    }
}

fn push_drift(lines: &mut Vec<NarrativeLine>, drift: &DriftReport) {
    lines.push(NarrativeLine::new(Tone::Alert, drift.headline()));
    lines.push(NarrativeLine::new(
        Tone::Alert,
        format!(
            "Last commit by {} {}",
            drift.last_commit.author,
            drift.last_commit.formatted_date()
        ),
    ));
    lines.push(NarrativeLine::new(
        Tone::Alert,
        format!("{} {}", drift.last_commit.short_hash, drift.last_commit.subject),
    ));
}

fn push_steps(lines: &mut Vec<NarrativeLine>, steps: &[UpdateStep]) {
    lines.push(NarrativeLine::new(Tone::Plain, ":."));
    lines.extend(steps.iter().filter_map(UpdateStep::narrative));
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Messages partitioned by bucket, each list in drain order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub outdated: Vec<RepoReport>,
    pub up_to_date: Vec<RepoReport>,
    pub diagnostics: Vec<RepoReport>,
}

impl Report {
    pub fn partition(messages: impl IntoIterator<Item = RepoReport>) -> Self {
        let mut report = Report::default();
        for message in messages {
            match message.bucket() {
                Bucket::Outdated => report.outdated.push(message),
                Bucket::UpToDate => report.up_to_date.push(message),
                Bucket::Diagnostic => report.diagnostics.push(message),
            }
        }
        report
    }

    pub fn len(&self) -> usize {
        self.outdated.len() + self.up_to_date.len() + self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
