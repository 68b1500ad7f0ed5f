use crate::domain::prerelease::{ALPHA, BETA};
use crate::domain::{Branch, ReleaseType, Version};
use crate::error::{ReleaseTrainError, Result};

/// Compute the next version of a branch
///
/// - alpha: off the alpha track (a release, or a prerelease of another
///   identifier) the release type is applied as a pre-bump on the `alpha`
///   track, forcing a field bump. On the alpha track the existing alpha
///   counter is continued whatever the release type.
/// - beta: advances its own `beta` counter; labels do not matter.
/// - main: promotes to a release and advances the patch.
///
/// # Returns
/// * `Ok(Version)` - The version to commit on `branch`
/// * `Err` - If `branch` is alpha and no release type was given, or a field
///   would overflow
pub fn resolve_next_version(
    branch: Branch,
    current: &Version,
    release: Option<ReleaseType>,
) -> Result<Version> {
    match branch {
        Branch::Alpha => {
            let release = release.ok_or_else(|| {
                ReleaseTrainError::version("alpha needs a release type to compute its version")
            })?;
            if current.is_on_track(ALPHA) {
                current.increment(ReleaseType::Prerelease, Some(ALPHA))
            } else {
                current.increment(release.as_pre_bump(), Some(ALPHA))
            }
        }
        Branch::Beta => current.increment(ReleaseType::Prerelease, Some(BETA)),
        Branch::Main => current.increment(ReleaseType::Patch, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_alpha_from_release_forces_field_bump() {
        let next =
            resolve_next_version(Branch::Alpha, &v("2.0.0"), Some(ReleaseType::Prepatch)).unwrap();
        assert_eq!(next, v("2.0.1-alpha.0"));
    }

    #[test]
    fn test_alpha_continues_counter() {
        let next = resolve_next_version(
            Branch::Alpha,
            &v("2.0.1-alpha.0"),
            Some(ReleaseType::Prerelease),
        )
        .unwrap();
        assert_eq!(next, v("2.0.1-alpha.1"));
    }

    #[test]
    fn test_alpha_from_beta_prerelease() {
        let next = resolve_next_version(
            Branch::Alpha,
            &v("1.4.0-beta.3"),
            Some(ReleaseType::Preminor),
        )
        .unwrap();
        assert_eq!(next, v("1.5.0-alpha.0"));
    }

    #[test]
    fn test_alpha_escalated_prerelease_off_track_bumps_patch() {
        let next = resolve_next_version(
            Branch::Alpha,
            &v("1.4.0-beta.3"),
            Some(ReleaseType::Prerelease),
        )
        .unwrap();
        assert_eq!(next, v("1.4.1-alpha.0"));
    }

    #[test]
    fn test_alpha_on_track_continues_counter_for_field_labels() {
        for release in [
            ReleaseType::Premajor,
            ReleaseType::Preminor,
            ReleaseType::Prepatch,
        ] {
            let next = resolve_next_version(Branch::Alpha, &v("1.2.0-alpha.3"), Some(release))
                .unwrap();
            assert_eq!(next, v("1.2.0-alpha.4"), "release type {}", release);
        }
    }

    #[test]
    fn test_alpha_overflowing_field_is_an_error() {
        let result = resolve_next_version(
            Branch::Alpha,
            &v("18446744073709551615.0.0"),
            Some(ReleaseType::Premajor),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_alpha_plain_field_bump_becomes_pre_bump() {
        let next =
            resolve_next_version(Branch::Alpha, &v("1.0.0"), Some(ReleaseType::Major)).unwrap();
        assert_eq!(next, v("2.0.0-alpha.0"));
    }

    #[test]
    fn test_alpha_requires_release_type() {
        assert!(resolve_next_version(Branch::Alpha, &v("1.0.0"), None).is_err());
    }

    #[test]
    fn test_beta_ignores_release_type() {
        let current = v("1.2.4-beta.1");
        let with_label =
            resolve_next_version(Branch::Beta, &current, Some(ReleaseType::Premajor)).unwrap();
        let without = resolve_next_version(Branch::Beta, &current, None).unwrap();
        assert_eq!(with_label, v("1.2.4-beta.2"));
        assert_eq!(without, with_label);
    }

    #[test]
    fn test_beta_after_release() {
        let next = resolve_next_version(Branch::Beta, &v("1.2.4"), None).unwrap();
        assert_eq!(next, v("1.2.5-beta.0"));
    }

    #[test]
    fn test_main_promotes_and_bumps_patch() {
        assert_eq!(
            resolve_next_version(Branch::Main, &v("1.2.4-beta.2"), None).unwrap(),
            v("1.2.5")
        );
        assert_eq!(
            resolve_next_version(Branch::Main, &v("1.2.4"), Some(ReleaseType::Premajor)).unwrap(),
            v("1.2.5")
        );
    }
}
