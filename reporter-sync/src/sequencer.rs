//! Per-repository drift check and safe update.
//!
//! ```text
//! Start -> Probed -> NotDiverged | Diverged
//! Diverged (update) -> StatusChecked -> ConflictBlocked | ConflictForciblyAborted | NoConflict
//!   -> Stashed? -> BranchSwitched -> Integrated -> StashReapplied | StashKept | NoStashToReapply
//!   -> Success
//! ```
//!
//! Any failing step ends in `Failed`, keeping the drift and the steps
//! completed so far. Missing remotes and branches end in `Skipped`.

use std::path::Path;

use reporter_core::{
    AbortKind, DriftReport, RepoName, RepoReport, RepositoryTarget, SkipReason, SyncConfig,
    UpdateOutcome, UpdateStep,
};

use crate::git::Git;
use crate::probe::{resolve_target, Probe};
use crate::{stash, SyncContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Probed,
    NotDiverged,
    Diverged,
    StatusChecked,
    ConflictBlocked,
    ConflictForciblyAborted,
    NoConflict,
    Stashed,
    BranchSwitched,
    Integrated,
    StashReapplied,
    StashKept,
    NoStashToReapply,
    Success,
    Failed,
}

/// Check one directory and, when configured, bring it up to date.
pub async fn check_repository(dir: &Path, ctx: &SyncContext) -> RepoReport {
    let target = match resolve_target(dir, ctx.config.timeout).await {
        Ok(target) => target,
        Err(err) => {
            tracing::debug!(phase = ?Phase::Failed, error = %err, "no working-copy root");
            return RepoReport {
                name: RepoName::from_path(dir),
                path: dir.to_path_buf(),
                outcome: UpdateOutcome::failed(format!(
                    "Error getting Git root for {}: {err}",
                    dir.display()
                )),
            };
        }
    };

    let outcome = Sequencer::new(&target, ctx).run().await;
    RepoReport {
        name: target.name,
        path: target.root,
        outcome,
    }
}

struct Sequencer<'a> {
    target: &'a RepositoryTarget,
    config: &'a SyncConfig,
    probe: Probe,
    steps: Vec<UpdateStep>,
}

impl<'a> Sequencer<'a> {
    fn new(target: &'a RepositoryTarget, ctx: &'a SyncContext) -> Self {
        let git = Git::new(target.root.clone(), ctx.config.timeout);
        Self {
            target,
            config: &ctx.config,
            probe: Probe::new(git, ctx.runner.clone()),
            steps: Vec::new(),
        }
    }

    fn enter(&self, phase: Phase) {
        tracing::debug!(?phase, "sequencer phase");
    }

    async fn run(mut self) -> UpdateOutcome {
        self.enter(Phase::Start);
        let drift = match self.probe_drift().await {
            Ok(Some(drift)) => drift,
            Ok(None) => {
                self.enter(Phase::NotDiverged);
                return UpdateOutcome::UpToDate;
            }
            Err(outcome) => {
                self.enter(Phase::Failed);
                return outcome;
            }
        };

        self.enter(Phase::Diverged);
        if !self.config.auto_update {
            return UpdateOutcome::Diverged { drift };
        }

        match self.update().await {
            Ok(()) => {
                self.enter(Phase::Success);
                UpdateOutcome::DivergedAndUpdated {
                    drift,
                    steps: self.steps,
                }
            }
            Err(reason) => {
                self.enter(Phase::Failed);
                UpdateOutcome::Failed {
                    drift: Some(drift),
                    steps: self.steps,
                    reason,
                }
            }
        }
    }

    /// `Ok(None)` when the local branch already contains the remote branch.
    async fn probe_drift(&self) -> Result<Option<DriftReport>, UpdateOutcome> {
        let name = &self.target.name;
        let remote = self.config.remote_name.as_str();
        let branch = self.config.branch.as_str();

        let has_remote = self
            .probe
            .remote_exists(remote)
            .await
            .map_err(|err| UpdateOutcome::failed(format!("Error checking remote {name}: {err}")))?;
        if !has_remote {
            return Err(UpdateOutcome::Skipped {
                skip: SkipReason::NoRemote {
                    remote: remote.to_string(),
                },
            });
        }

        self.probe
            .fetch(remote)
            .await
            .map_err(|err| UpdateOutcome::failed(format!("Error fetching {name}. {err}")))?;

        let local = self
            .probe
            .branch_exists_locally(branch)
            .await
            .map_err(|err| UpdateOutcome::failed(format!("Error checking branch {branch} in {name}: {err}")))?;
        if !local {
            return Err(UpdateOutcome::Skipped {
                skip: SkipReason::NoLocalBranch {
                    branch: branch.to_string(),
                },
            });
        }

        let tracked = self
            .probe
            .branch_exists_remotely(remote, branch)
            .await
            .map_err(|err| UpdateOutcome::failed(format!("Error checking branch {remote}/{branch} in {name}: {err}")))?;
        if !tracked {
            return Err(UpdateOutcome::Skipped {
                skip: SkipReason::NoRemoteBranch {
                    branch: branch.to_string(),
                },
            });
        }

        let behind = self
            .probe
            .commits_behind(branch, remote)
            .await
            .map_err(|err| UpdateOutcome::failed(format!("Error checking rev-list {name}: {err}")))?;
        self.enter(Phase::Probed);
        tracing::info!(behind = %behind, "compared {branch} with {remote}/{branch}");
        if behind.is_zero() {
            return Ok(None);
        }

        let last_commit = self
            .probe
            .last_commit(remote, branch)
            .await
            .map_err(|err| {
                UpdateOutcome::failed(format!("Error checking last commit author {name}: {err}"))
            })?;

        Ok(Some(DriftReport {
            repository: self.target.clone(),
            behind,
            last_commit,
        }))
    }

    async fn update(&mut self) -> Result<(), String> {
        let name = self.target.name.clone();
        let remote = self.config.remote_name.clone();
        let branch = self.config.branch.clone();
        let git = self.probe.git().clone();

        let mut status = self
            .probe
            .status()
            .await
            .map_err(|err| format!("Error checking status for {name}\n{err}"))?;
        self.enter(Phase::StatusChecked);

        let conflict = status.conflict();
        if conflict.conflicted {
            if !self.config.force_resolve_conflicts {
                self.enter(Phase::ConflictBlocked);
                return Err(format!(
                    "{name} has merge conflicts in file(s) or there's a rebase in progress.\n\
                     To update anyway use --update --force. This aborts rebase and merge conflicts."
                ));
            }

            let kind = if conflict.rebase {
                AbortKind::Rebase
            } else {
                AbortKind::Merge
            };
            self.steps.push(UpdateStep::ForcedAbort { kind });
            let (args, label) = match kind {
                AbortKind::Rebase => (["rebase", "--abort"], "rebase"),
                AbortKind::Merge => (["merge", "--abort"], "merge"),
            };
            git.run(&args)
                .await
                .map_err(|err| format!("Error aborting {label} {name}: {err}"))?;
            self.enter(Phase::ConflictForciblyAborted);

            status = self
                .probe
                .status()
                .await
                .map_err(|err| format!("Error checking status for {name}\n{err}"))?;
        } else {
            self.enter(Phase::NoConflict);
        }

        let mut created = None;
        if !status.is_clean() {
            created = stash::push(&git)
                .await
                .map_err(|err| format!("Error stashing changes in {name}: {err}"))?;
            if created.is_some() {
                self.steps.push(UpdateStep::Stashed);
                self.enter(Phase::Stashed);
            }
        }

        git.run(&["checkout", &branch]).await.map_err(|err| {
            format!("Error checking out branch {branch} in repository {name}: {err}")
        })?;
        self.enter(Phase::BranchSwitched);

        let upstream = format!("{remote}/{branch}");
        git.run(&["merge", "--ff-only", &upstream])
            .await
            .map_err(|err| format!("Error pulling {upstream} in repository {name}: {err}"))?;
        self.steps.push(UpdateStep::Pulled);
        self.enter(Phase::Integrated);

        let Some(created) = created else {
            self.steps.push(UpdateStep::NoStashToReapply);
            self.enter(Phase::NoStashToReapply);
            return Ok(());
        };

        let top = stash::top(&git)
            .await
            .map_err(|err| format!("Error applying stash in {name}: {err}"))?;
        match top {
            Some(entry) if stash::is_own(&entry, &created, &branch) => {
                stash::pop(&git)
                    .await
                    .map_err(|err| format!("Error applying stash in {name}: {err}"))?;
                self.steps.push(UpdateStep::StashReapplied);
                self.enter(Phase::StashReapplied);
            }
            _ => {
                tracing::info!(stash = %created, "stash not eligible for reapplying; leaving it in place");
                self.steps.push(UpdateStep::StashKept);
                self.enter(Phase::StashKept);
            }
        }
        Ok(())
    }
}
