use std::fmt;

/// Reasons a trigger ends without doing anything.
/// These are normal outcomes, not errors: the run still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither the trigger ref nor the pull request's source ref names a managed branch
    UnmanagedBranch {
        git_ref: String,
        source_ref: Option<String>,
    },
    /// The pull request carries no release label
    NoReleaseLabel { labels: Vec<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnmanagedBranch {
                git_ref,
                source_ref: Some(source_ref),
            } => write!(
                f,
                "Unsupported branch: neither '{}' nor pull request source '{}' is alpha, beta or main",
                git_ref, source_ref
            ),
            SkipReason::UnmanagedBranch {
                git_ref,
                source_ref: None,
            } => write!(
                f,
                "Unsupported branch: '{}' is not alpha, beta or main",
                git_ref
            ),
            SkipReason::NoReleaseLabel { labels } if labels.is_empty() => {
                write!(f, "No release label (major, minor, patch) on the pull request")
            }
            SkipReason::NoReleaseLabel { labels } => write!(
                f,
                "No release label (major, minor, patch) among: {}",
                labels.join(", ")
            ),
        }
    }
}

/// Non-fatal problems raised while propagating a bump to the neighbor branch.
/// The bump on the target branch has already landed when these occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    /// Compare-and-swap push was refused because the remote moved
    PushRejected { branch: String, reason: String },
    /// Neighbor is behind with conflicting changes; a human has to merge
    Divergence {
        from: String,
        into: String,
        ours: String,
        theirs: String,
    },
    /// The propagation step failed outright
    Failed {
        from: String,
        into: String,
        reason: String,
    },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncWarning::PushRejected { branch, reason } => {
                write!(f, "Push of '{}' was rejected: {}", branch, reason)
            }
            SyncWarning::Divergence {
                from,
                into,
                ours,
                theirs,
            } => write!(
                f,
                "Cannot merge '{}' ({}) into '{}' ({}) automatically; please open a pull request from {} to {} and resolve the conflicts manually",
                from, theirs, into, ours, from, into
            ),
            SyncWarning::Failed { from, into, reason } => {
                write!(f, "Failed to sync '{}' into '{}': {}", from, into, reason)
            }
        }
    }
}
