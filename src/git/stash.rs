use crate::git::{GitResult, VersionControl};
use crate::ui;

/// Scoped branch switch that keeps uncommitted work safe
///
/// Stashes tracked changes if the tree is dirty, then checks out the branch.
/// Dropping the guard pops the stash again when something was stashed, on
/// every exit path including early returns.
pub struct StashGuard<'a> {
    vcs: &'a dyn VersionControl,
    stashed: bool,
}

impl<'a> StashGuard<'a> {
    /// Switch to `branch` at `start_point`
    pub fn switch(
        vcs: &'a dyn VersionControl,
        branch: &str,
        start_point: &str,
    ) -> GitResult<StashGuard<'a>> {
        let stashed = if vcs.is_dirty()? { vcs.stash()? } else { false };
        let guard = StashGuard { vcs, stashed };

        vcs.checkout(branch, start_point)?;
        tracing::debug!(branch, start_point, stashed, "switched branch");

        Ok(guard)
    }

    pub fn stashed(&self) -> bool {
        self.stashed
    }
}

impl Drop for StashGuard<'_> {
    fn drop(&mut self) {
        if !self.stashed {
            return;
        }
        if let Err(e) = self.vcs.stash_pop() {
            ui::display_warning(&format!(
                "Could not restore stashed changes, they remain in the stash: {}",
                e
            ));
        }
    }
}
