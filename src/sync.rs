//! Propagation of a version bump into the neighbor branch
//!
//! Two edges exist: `main -> beta` and `beta -> alpha`. Each one fetches both
//! branches, switches to the neighbor, merges the bumped branch and pushes the
//! neighbor back with a compare-and-swap lease. When the merge conflicts:
//!
//! - `main -> beta`: main always wins. Beta is reset to main and an empty commit
//!   records the sync.
//! - `beta -> alpha`: if alpha is already ahead of the new beta version, the
//!   merge is redone preferring alpha's side and alpha's version is kept.
//!   Otherwise nothing is changed and maintainers are asked to merge by hand.

use std::path::Path;

use crate::boundary::SyncWarning;
use crate::config::MessagesConfig;
use crate::domain::{Branch, Version};
use crate::error::Result;
use crate::git::{remote_ref, GitFailure, MergeStrategy, StashGuard, VersionControl};
use crate::manifest::PackageManifest;
use crate::ui;

/// How a conflicting merge was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// No conflict
    None,
    /// Neighbor was reset to the upstream branch
    ForceSync,
    /// Upstream's conflicting changes were dropped in favor of the neighbor
    Discarded,
    /// Left for a human to resolve
    Escalated,
}

/// What happened to the neighbor's push
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    Rejected { reason: String },
    Skipped,
}

/// Record of one propagation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub target: Branch,
    pub neighbor: Branch,
    /// Whether the upstream branch merged without conflicts
    pub merged: bool,
    pub resolution: ConflictResolution,
    pub push: PushOutcome,
    /// Neighbor's own version before the sync, when it was read
    pub neighbor_version: Option<Version>,
}

impl SyncOutcome {
    /// Warnings worth surfacing for this outcome
    pub fn warnings(&self, target_version: &Version) -> Vec<SyncWarning> {
        let mut warnings = Vec::new();

        if self.resolution == ConflictResolution::Escalated {
            warnings.push(SyncWarning::Divergence {
                from: self.target.to_string(),
                into: self.neighbor.to_string(),
                ours: self
                    .neighbor_version
                    .as_ref()
                    .map(Version::to_string)
                    .unwrap_or_else(|| "unknown".to_string()),
                theirs: target_version.to_string(),
            });
        }

        if let PushOutcome::Rejected { reason } = &self.push {
            warnings.push(SyncWarning::PushRejected {
                branch: self.neighbor.to_string(),
                reason: reason.clone(),
            });
        }

        warnings
    }
}

/// Propagates a freshly pushed bump into the neighbor branch
pub struct BranchSynchronizer<'a> {
    vcs: &'a dyn VersionControl,
    remote: &'a str,
    manifest: &'a Path,
    messages: &'a MessagesConfig,
}

impl<'a> BranchSynchronizer<'a> {
    /// Create a synchronizer
    ///
    /// `manifest` is relative to the working tree root.
    pub fn new(
        vcs: &'a dyn VersionControl,
        remote: &'a str,
        manifest: &'a Path,
        messages: &'a MessagesConfig,
    ) -> Self {
        BranchSynchronizer {
            vcs,
            remote,
            manifest,
            messages,
        }
    }

    /// Reconcile the branch downstream of `target` after it was bumped to `new_version`
    ///
    /// # Returns
    /// * `Ok(None)` - `target` has no downstream branch
    /// * `Ok(Some(SyncOutcome))` - The edge ran; conflicts and rejected pushes
    ///   are recorded in the outcome
    /// * `Err` - A git call failed in a way no policy covers
    pub fn synchronize(
        &self,
        target: Branch,
        new_version: &Version,
    ) -> Result<Option<SyncOutcome>> {
        let outcome = match target.downstream() {
            None => return Ok(None),
            Some(Branch::Beta) => self.sync_main_into_beta(new_version)?,
            Some(neighbor) => self.sync_into_alpha(target, neighbor, new_version)?,
        };
        Ok(Some(outcome))
    }

    /// `main -> beta`: main always wins
    fn sync_main_into_beta(&self, new_version: &Version) -> Result<SyncOutcome> {
        let (upstream, neighbor) = (Branch::Main, Branch::Beta);
        let lease = self.prepare(upstream, neighbor)?;
        let _guard = StashGuard::switch(self.vcs, neighbor.name(), &self.tracking(neighbor))?;

        let upstream_ref = self.tracking(upstream);
        let message = self
            .messages
            .sync(upstream.name(), neighbor.name(), &new_version.to_string());

        let (merged, resolution) =
            match self.vcs.merge(&upstream_ref, &message, MergeStrategy::Default) {
                Ok(()) => (true, ConflictResolution::None),
                Err(failure) if failure.is_conflict() => {
                    ui::display_warning(&format!(
                        "Merging {} into {} conflicted, resetting {} to {}",
                        upstream, neighbor, neighbor, upstream_ref
                    ));
                    self.vcs.reset_hard(&upstream_ref)?;
                    self.vcs.commit(&message, true)?;
                    (false, ConflictResolution::ForceSync)
                }
                Err(failure) => return Err(failure.into()),
            };

        let push = self.push_with_lease(neighbor, &lease);
        Ok(SyncOutcome {
            target: upstream,
            neighbor,
            merged,
            resolution,
            push,
            neighbor_version: None,
        })
    }

    /// `beta -> alpha`: only the safe case is resolved automatically
    fn sync_into_alpha(
        &self,
        upstream: Branch,
        neighbor: Branch,
        new_version: &Version,
    ) -> Result<SyncOutcome> {
        let lease = self.prepare(upstream, neighbor)?;
        let _guard = StashGuard::switch(self.vcs, neighbor.name(), &self.tracking(neighbor))?;

        let manifest_path = self.vcs.workdir().join(self.manifest);
        let neighbor_version = PackageManifest::load(&manifest_path)?.version()?;

        let upstream_ref = self.tracking(upstream);
        let message = self
            .messages
            .sync(upstream.name(), neighbor.name(), &new_version.to_string());

        let conflict = match self.vcs.merge(&upstream_ref, &message, MergeStrategy::Default) {
            Ok(()) => None,
            Err(failure) if failure.is_conflict() => Some(failure),
            Err(failure) => return Err(failure.into()),
        };

        let Some(conflict) = conflict else {
            let push = self.push_with_lease(neighbor, &lease);
            return Ok(SyncOutcome {
                target: upstream,
                neighbor,
                merged: true,
                resolution: ConflictResolution::None,
                push,
                neighbor_version: Some(neighbor_version),
            });
        };

        tracing::debug!(%conflict, %neighbor_version, %new_version, "merge conflicted");
        self.vcs.abort_merge()?;

        if neighbor_version <= *new_version {
            let warning = SyncWarning::Divergence {
                from: upstream.to_string(),
                into: neighbor.to_string(),
                ours: neighbor_version.to_string(),
                theirs: new_version.to_string(),
            };
            ui::display_sync_warning(&warning);
            return Ok(SyncOutcome {
                target: upstream,
                neighbor,
                merged: false,
                resolution: ConflictResolution::Escalated,
                push: PushOutcome::Skipped,
                neighbor_version: Some(neighbor_version),
            });
        }

        ui::display_status(&format!(
            "{} ({}) is ahead of {} ({}), keeping {}'s version",
            neighbor, neighbor_version, upstream, new_version, neighbor
        ));
        self.discard_upstream_version(&upstream_ref, &message, &manifest_path, &neighbor_version)?;

        let keep = self.messages.keep(
            neighbor.name(),
            &neighbor_version.to_string(),
            upstream.name(),
        );
        self.vcs.add(self.manifest)?;
        self.vcs.commit(&keep, true)?;

        let push = self.push_with_lease(neighbor, &lease);
        Ok(SyncOutcome {
            target: upstream,
            neighbor,
            merged: false,
            resolution: ConflictResolution::Discarded,
            push,
            neighbor_version: Some(neighbor_version),
        })
    }

    /// Redo the merge preferring our side, then pin the manifest version
    fn discard_upstream_version(
        &self,
        upstream_ref: &str,
        message: &str,
        manifest_path: &Path,
        keep: &Version,
    ) -> Result<()> {
        if let Err(failure) = self.vcs.merge(upstream_ref, message, MergeStrategy::PreferOurs) {
            if failure.is_conflict() {
                self.vcs.abort_merge()?;
            }
            return Err(failure.into());
        }

        let mut manifest = PackageManifest::load(manifest_path)?;
        manifest.set_version(keep);
        manifest.save(manifest_path)
    }

    /// Fetch both sides and return the neighbor's remote commit as the push lease
    fn prepare(&self, upstream: Branch, neighbor: Branch) -> Result<String> {
        ui::display_status(&format!("Syncing {} into {}", upstream, neighbor));
        self.vcs
            .fetch(self.remote, &[upstream.name(), neighbor.name()])?;
        Ok(self.vcs.rev_parse(&self.tracking(neighbor))?)
    }

    fn push_with_lease(&self, branch: Branch, lease: &str) -> PushOutcome {
        match self.vcs.push(self.remote, branch.name(), Some(lease)) {
            Ok(()) => PushOutcome::Pushed,
            Err(failure) => {
                self.report_push_failure(branch, &failure);
                PushOutcome::Rejected {
                    reason: failure.stderr,
                }
            }
        }
    }

    fn report_push_failure(&self, branch: Branch, failure: &GitFailure) {
        let reason = if failure.is_rejected() {
            format!("{} moved on the remote since it was fetched", branch)
        } else {
            failure.to_string()
        };
        ui::display_sync_warning(&SyncWarning::PushRejected {
            branch: branch.to_string(),
            reason,
        });
    }

    fn tracking(&self, branch: Branch) -> String {
        remote_ref(self.remote, branch.name())
    }
}
