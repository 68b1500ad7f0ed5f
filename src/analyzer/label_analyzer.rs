use crate::boundary::SkipReason;
use crate::config::LabelsConfig;
use crate::domain::{Decision, ReleaseType, Version};
use std::collections::BTreeSet;

/// Classifies a pull request's labels into a release type
pub struct LabelAnalyzer {
    config: LabelsConfig,
}

impl LabelAnalyzer {
    /// Create a new label analyzer
    pub fn new(config: LabelsConfig) -> Self {
        LabelAnalyzer { config }
    }

    /// Pick the release type for a branch at `current`, given beta's version
    ///
    /// Major beats minor beats patch. A branch already ahead of beta only
    /// advances its prerelease counter, so a second field bump never happens.
    pub fn classify(
        &self,
        labels: &BTreeSet<String>,
        beta_version: &Version,
        current_version: &Version,
    ) -> Decision<ReleaseType> {
        let has = |aliases: &[String]| {
            labels
                .iter()
                .any(|label| aliases.iter().any(|alias| alias.eq_ignore_ascii_case(label)))
        };

        let selected = if has(self.config.major.as_slice()) {
            ReleaseType::Premajor
        } else if has(self.config.minor.as_slice()) {
            ReleaseType::Preminor
        } else if has(self.config.patch.as_slice()) {
            ReleaseType::Prepatch
        } else {
            return Decision::Skip(SkipReason::NoReleaseLabel {
                labels: labels.iter().cloned().collect(),
            });
        };

        if current_version > beta_version {
            tracing::debug!(
                %current_version,
                %beta_version,
                %selected,
                "branch is ahead of beta, using prerelease"
            );
            return Decision::Proceed(ReleaseType::Prerelease);
        }

        Decision::Proceed(selected)
    }
}
