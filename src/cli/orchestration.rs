//! Main workflow orchestration logic
//!
//! Keeps CLI argument parsing in main.rs apart from the release workflow, so
//! the workflow can be driven programmatically and against a mock repository.

use crate::analyzer::{resolve_next_version, LabelAnalyzer};
use crate::boundary::{SkipReason, SyncWarning};
use crate::config::Config;
use crate::context::TriggerContext;
use crate::domain::{resolve_branch, Branch, Decision, ReleaseType, Version};
use crate::error::{ReleaseTrainError, Result};
use crate::git::{remote_ref, StashGuard, VersionControl};
use crate::manifest::PackageManifest;
use crate::sync::{BranchSynchronizer, SyncOutcome};
use crate::ui;

/// Arguments for the release workflow
///
/// Mirrors the CLI flags that affect the workflow itself, decoupled from clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseWorkflowArgs {
    /// Compute and report the next version without writing, committing or pushing
    pub dry_run: bool,
}

/// Result of a release workflow run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResult {
    /// The target branch was bumped (or would have been, in dry-run mode)
    Released {
        branch: Branch,
        previous: Version,
        next: Version,
        /// Propagation into the neighbor branch, when one was attempted
        sync: Option<SyncOutcome>,
        /// Non-fatal problems met while propagating
        warnings: Vec<SyncWarning>,
        dry_run: bool,
    },
    /// Nothing to do for this trigger
    Skipped(SkipReason),
}

impl WorkflowResult {
    /// The version to expose to later steps, if any
    pub fn next_version(&self) -> Option<&Version> {
        match self {
            WorkflowResult::Released { next, .. } => Some(next),
            WorkflowResult::Skipped(_) => None,
        }
    }
}

/// Main release workflow
///
/// 1. Resolve the target branch from the trigger
/// 2. Fetch and switch to the target (a dry run reads the remote branch instead)
/// 3. Read the current version from the manifest
/// 4. Classify the pull request labels (alpha and beta)
/// 5. Compute the next version
/// 6. Write, commit and push the bump
/// 7. Propagate the bump into the neighbor branch
///
/// Steps 1 to 6 are fatal on error. A failure in step 7 is reported as a
/// [`SyncWarning::Failed`] and the run still succeeds.
pub fn run_release_workflow(
    args: &ReleaseWorkflowArgs,
    config: &Config,
    trigger: &TriggerContext,
    vcs: &dyn VersionControl,
) -> Result<WorkflowResult> {
    let branch = match resolve_branch(&trigger.git_ref, trigger.pull_request.as_ref()) {
        Decision::Proceed(branch) => branch,
        Decision::Skip(reason) => {
            ui::display_skip(&reason);
            return Ok(WorkflowResult::Skipped(reason));
        }
    };
    tracing::info!(%branch, git_ref = %trigger.git_ref, "resolved target branch");

    let mut fetch: Vec<&str> = vec![branch.name()];
    if branch == Branch::Alpha {
        fetch.push(Branch::Beta.name());
    }
    ui::display_status(&format!("Fetching {} from {}", fetch.join(", "), config.remote));
    vcs.fetch(&config.remote, &fetch)?;

    // A dry run reads the remote manifest and leaves the working tree alone
    let target = remote_ref(&config.remote, branch.name());
    let (guard, mut manifest) = if args.dry_run {
        (None, read_manifest_at(config, vcs, &target)?)
    } else {
        let guard = StashGuard::switch(vcs, branch.name(), &target)?;
        if guard.stashed() {
            ui::display_status("Stashed local changes, they are restored after the push");
        }
        let manifest = PackageManifest::load(&vcs.workdir().join(&config.manifest))?;
        (Some(guard), manifest)
    };
    let current = manifest.version()?;

    let release = match classify(branch, config, trigger, vcs, &current)? {
        Decision::Proceed(release) => release,
        Decision::Skip(reason) => {
            ui::display_skip(&reason);
            return Ok(WorkflowResult::Skipped(reason));
        }
    };

    let next = resolve_next_version(branch, &current, release)?;
    ui::display_version_change(branch.name(), &current.to_string(), &next.to_string());

    if args.dry_run {
        ui::display_status(&format!(
            "Dry run: would commit and push {} to {}, then sync {}",
            next,
            branch,
            branch
                .downstream()
                .map(|b| b.name())
                .unwrap_or("nothing")
        ));
        return Ok(WorkflowResult::Released {
            branch,
            previous: current,
            next,
            sync: None,
            warnings: Vec::new(),
            dry_run: true,
        });
    }

    manifest.set_version(&next);
    manifest.save(&vcs.workdir().join(&config.manifest))?;
    vcs.add(&config.manifest)?;
    vcs.commit(&config.messages.bump(&next.to_string(), branch.name()), false)?;
    vcs.push(&config.remote, branch.name(), None)?;
    ui::display_success(&format!("Pushed {} to {}", next, branch));
    // Local changes come back before the sync takes over the working tree
    drop(guard);

    let (sync, warnings) = synchronize(config, vcs, branch, &next);

    Ok(WorkflowResult::Released {
        branch,
        previous: current,
        next,
        sync,
        warnings,
        dry_run: false,
    })
}

/// Release type requested by the trigger; main needs none
fn classify(
    branch: Branch,
    config: &Config,
    trigger: &TriggerContext,
    vcs: &dyn VersionControl,
    current: &Version,
) -> Result<Decision<Option<ReleaseType>>> {
    if branch.is_release_branch() {
        return Ok(Decision::Proceed(None));
    }

    let beta_version = if branch == Branch::Beta {
        current.clone()
    } else {
        read_beta_version(config, vcs)?
    };

    let labels = trigger
        .pull_request
        .as_ref()
        .map(|pr| pr.labels.clone())
        .unwrap_or_default();

    Ok(LabelAnalyzer::new(config.labels.clone())
        .classify(&labels, &beta_version, current)
        .map(Some))
}

fn read_beta_version(config: &Config, vcs: &dyn VersionControl) -> Result<Version> {
    read_manifest_at(config, vcs, &remote_ref(&config.remote, Branch::Beta.name()))?.version()
}

/// Manifest as committed at `rev`, without touching the working tree
fn read_manifest_at(
    config: &Config,
    vcs: &dyn VersionControl,
    rev: &str,
) -> Result<PackageManifest> {
    let content = vcs.show_file(rev, &config.manifest).map_err(|e| {
        ReleaseTrainError::manifest(format!(
            "Cannot read {} at {}: {}",
            config.manifest.display(),
            rev,
            e
        ))
    })?;
    PackageManifest::parse(&content)
}

/// Run the neighbor sync, turning every failure into a warning
fn synchronize(
    config: &Config,
    vcs: &dyn VersionControl,
    branch: Branch,
    next: &Version,
) -> (Option<SyncOutcome>, Vec<SyncWarning>) {
    let Some(neighbor) = branch.downstream() else {
        return (None, Vec::new());
    };

    let synchronizer =
        BranchSynchronizer::new(vcs, &config.remote, &config.manifest, &config.messages);
    match synchronizer.synchronize(branch, next) {
        Ok(Some(outcome)) => {
            ui::display_sync_outcome(&outcome);
            let warnings = outcome.warnings(next);
            (Some(outcome), warnings)
        }
        Ok(None) => (None, Vec::new()),
        Err(e) => {
            let warning = SyncWarning::Failed {
                from: branch.to_string(),
                into: neighbor.to_string(),
                reason: e.to_string(),
            };
            ui::display_sync_warning(&warning);
            (None, vec![warning])
        }
    }
}
