use crate::boundary::SkipReason;
use crate::context::PullRequestContext;
use crate::domain::decision::Decision;
use std::fmt;
use std::str::FromStr;

/// One of the three long-lived branches of the release train
///
/// Propagation runs `main -> beta -> alpha`: main is the most authoritative,
/// alpha the most volatile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Alpha,
    Beta,
    Main,
}

impl Branch {
    pub fn name(self) -> &'static str {
        match self {
            Branch::Alpha => "alpha",
            Branch::Beta => "beta",
            Branch::Main => "main",
        }
    }

    /// The branch a bump on `self` is propagated into
    pub fn downstream(self) -> Option<Branch> {
        match self {
            Branch::Main => Some(Branch::Beta),
            Branch::Beta => Some(Branch::Alpha),
            Branch::Alpha => None,
        }
    }

    /// Check if this is the release branch
    pub fn is_release_branch(self) -> bool {
        self == Branch::Main
    }
}

impl FromStr for Branch {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alpha" => Ok(Branch::Alpha),
            "beta" => Ok(Branch::Beta),
            "main" => Ok(Branch::Main),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Determine which managed branch a trigger operates on
///
/// The last segment of the trigger ref wins when it is a managed branch.
/// Otherwise the pull request's source ref is searched from its last segment
/// backwards, so namespaced heads such as `alpha/hotfix` still resolve.
pub fn resolve_branch(
    git_ref: &str,
    pull_request: Option<&PullRequestContext>,
) -> Decision<Branch> {
    let last_segment = git_ref.rsplit('/').next().unwrap_or_default();
    if let Ok(branch) = last_segment.parse::<Branch>() {
        return Decision::Proceed(branch);
    }

    if let Some(pr) = pull_request {
        if let Some(branch) = pr.source_ref.rsplit('/').find_map(|s| s.parse().ok()) {
            return Decision::Proceed(branch);
        }
    }

    Decision::Skip(SkipReason::UnmanagedBranch {
        git_ref: git_ref.to_string(),
        source_ref: pull_request.map(|pr| pr.source_ref.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn pr(source_ref: &str) -> PullRequestContext {
        PullRequestContext {
            number: 7,
            source_ref: source_ref.to_string(),
            labels: BTreeSet::new(),
        }
    }

    #[test]
    fn test_main_ref_resolves_directly() {
        let context = pr("refs/heads/alpha");
        assert_eq!(
            resolve_branch("refs/heads/main", Some(&context)),
            Decision::Proceed(Branch::Main)
        );
    }

    #[test]
    fn test_unmanaged_ref_falls_back_to_pull_request_source() {
        let context = pr("refs/heads/alpha/hotfix");
        assert_eq!(
            resolve_branch("refs/heads/feature/x", Some(&context)),
            Decision::Proceed(Branch::Alpha)
        );
    }

    #[test]
    fn test_merge_ref_falls_back_to_plain_head_ref() {
        let context = pr("beta");
        assert_eq!(
            resolve_branch("refs/pull/12/merge", Some(&context)),
            Decision::Proceed(Branch::Beta)
        );
    }

    #[test]
    fn test_unmanaged_without_pull_request_skips() {
        let decision = resolve_branch("refs/heads/develop", None);
        assert_eq!(
            decision,
            Decision::Skip(SkipReason::UnmanagedBranch {
                git_ref: "refs/heads/develop".to_string(),
                source_ref: None,
            })
        );
    }

    #[test]
    fn test_unmanaged_everywhere_skips() {
        let context = pr("refs/heads/feature/login");
        assert!(resolve_branch("refs/heads/feature/x", Some(&context)).is_skip());
    }

    #[test]
    fn test_trigger_ref_only_uses_last_segment() {
        assert!(resolve_branch("refs/heads/alpha/hotfix", None).is_skip());
    }

    #[test]
    fn test_downstream_edges() {
        assert_eq!(Branch::Main.downstream(), Some(Branch::Beta));
        assert_eq!(Branch::Beta.downstream(), Some(Branch::Alpha));
        assert_eq!(Branch::Alpha.downstream(), None);
    }

    #[test]
    fn test_release_branch() {
        assert!(Branch::Main.is_release_branch());
        assert!(!Branch::Beta.is_release_branch());
    }
}
