use crate::domain::prerelease::{Prerelease, ALPHA};
use crate::error::{ReleaseTrainError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
///
/// Immutable: every increment returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<Prerelease>,
}

impl Version {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Attach a prerelease tag
    pub fn with_prerelease(mut self, identifier: impl Into<String>, number: u64) -> Self {
        self.prerelease = Some(Prerelease::new(identifier, number));
        self
    }

    /// Parse a version string (e.g., "1.2.3", "v2.0.0-beta.4")
    pub fn parse(text: &str) -> Result<Self> {
        let clean = text
            .trim()
            .trim_start_matches('v')
            .trim_start_matches('V');

        let parsed = semver::Version::parse(clean).map_err(|e| {
            ReleaseTrainError::version(format!("Invalid version '{}': {}", text, e))
        })?;

        if !parsed.build.is_empty() {
            return Err(ReleaseTrainError::version(format!(
                "Build metadata is not supported: '{}'",
                text
            )));
        }

        let prerelease = if parsed.pre.is_empty() {
            None
        } else {
            Some(Prerelease::parse(parsed.pre.as_str())?)
        };

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            prerelease,
        })
    }

    /// Whether the version carries a prerelease with this identifier
    pub fn is_on_track(&self, identifier: &str) -> bool {
        self.prerelease.as_ref().is_some_and(|pre| pre.is(identifier))
    }

    /// Increment according to a release type
    ///
    /// `identifier` is only consulted for the pre-bumps. When it is absent the
    /// current identifier is reused, falling back to `alpha`.
    ///
    /// # Returns
    /// * `Ok(Version)` - The incremented version
    /// * `Err` - If a numeric field would overflow
    pub fn increment(&self, release: ReleaseType, identifier: Option<&str>) -> Result<Self> {
        let identifier = identifier
            .or(self.prerelease.as_ref().map(|pre| pre.identifier.as_str()))
            .unwrap_or(ALPHA);

        let version = match release {
            ReleaseType::Major => Version::new(self.bump_field(self.major, "major")?, 0, 0),
            ReleaseType::Minor => {
                Version::new(self.major, self.bump_field(self.minor, "minor")?, 0)
            }
            ReleaseType::Patch => {
                Version::new(self.major, self.minor, self.bump_field(self.patch, "patch")?)
            }
            ReleaseType::Premajor => self
                .increment(ReleaseType::Major, None)?
                .with_prerelease(identifier, 0),
            ReleaseType::Preminor => self
                .increment(ReleaseType::Minor, None)?
                .with_prerelease(identifier, 0),
            ReleaseType::Prepatch => self
                .increment(ReleaseType::Patch, None)?
                .with_prerelease(identifier, 0),
            ReleaseType::Prerelease if self.is_on_track(identifier) => Version {
                prerelease: self.prerelease.as_ref().map(Prerelease::next).transpose()?,
                ..self.clone()
            },
            ReleaseType::Prerelease => self.increment(ReleaseType::Prepatch, Some(identifier))?,
        };
        Ok(version)
    }

    fn bump_field(&self, value: u64, field: &str) -> Result<u64> {
        value.checked_add(1).ok_or_else(|| {
            ReleaseTrainError::version(format!(
                "Cannot increment {} of '{}': overflow",
                field, self
            ))
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = ReleaseTrainError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Release type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
}

impl ReleaseType {
    /// Map a plain field bump onto its pre-bump counterpart
    pub fn as_pre_bump(self) -> Self {
        match self {
            ReleaseType::Major => ReleaseType::Premajor,
            ReleaseType::Minor => ReleaseType::Preminor,
            ReleaseType::Patch => ReleaseType::Prepatch,
            other => other,
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::Premajor => "premajor",
            ReleaseType::Preminor => "preminor",
            ReleaseType::Prepatch => "prepatch",
            ReleaseType::Prerelease => "prerelease",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse() {
        let version = v("1.2.3");
        assert_eq!(version, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_prerelease() {
        let version = v("v2.0.1-alpha.7");
        assert_eq!(version, Version::new(2, 0, 1).with_prerelease("alpha", 7));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("not-a-version").is_err());
        assert!(Version::parse("1.2.3-alpha").is_err());
        assert!(Version::parse("1.2.3+build.5").is_err());
    }

    #[test]
    fn test_release_beats_prerelease_of_same_core() {
        assert!(v("1.2.0") > v("1.2.0-beta.9"));
        assert!(v("1.2.0") > v("1.2.0-alpha.100"));
        assert!(v("1.2.1-alpha.0") > v("1.2.0"));
    }

    #[test]
    fn test_prerelease_compare_identifier_then_number() {
        assert!(v("1.0.0-alpha.5") < v("1.0.0-beta.0"));
        assert!(v("1.0.0-beta.2") < v("1.0.0-beta.10"));
        assert_eq!(v("1.0.0-beta.2").cmp(&v("1.0.0-beta.2")), Ordering::Equal);
    }

    #[test]
    fn test_increment_patch_strips_prerelease() {
        assert_eq!(v("1.2.3").increment(ReleaseType::Patch, None).unwrap(), v("1.2.4"));
        assert_eq!(
            v("1.2.4-beta.2").increment(ReleaseType::Patch, None).unwrap(),
            v("1.2.5")
        );
    }

    #[test]
    fn test_increment_minor_and_major_zero_lower_fields() {
        assert_eq!(
            v("1.2.3-alpha.1").increment(ReleaseType::Minor, None).unwrap(),
            v("1.3.0")
        );
        assert_eq!(v("1.2.3").increment(ReleaseType::Major, None).unwrap(), v("2.0.0"));
    }

    #[test]
    fn test_increment_pre_bumps_start_at_zero() {
        let base = v("1.2.3");
        assert_eq!(
            base.increment(ReleaseType::Premajor, Some("alpha")).unwrap(),
            v("2.0.0-alpha.0")
        );
        assert_eq!(
            base.increment(ReleaseType::Preminor, Some("alpha")).unwrap(),
            v("1.3.0-alpha.0")
        );
        assert_eq!(
            base.increment(ReleaseType::Prepatch, Some("beta")).unwrap(),
            v("1.2.4-beta.0")
        );
    }

    #[test]
    fn test_increment_prerelease_from_release() {
        let first = v("1.2.3").increment(ReleaseType::Prerelease, Some("alpha")).unwrap();
        assert_eq!(first, v("1.2.4-alpha.0"));
        let second = first.increment(ReleaseType::Prerelease, Some("alpha")).unwrap();
        assert_eq!(second, v("1.2.4-alpha.1"));
    }

    #[test]
    fn test_increment_prerelease_foreign_identifier_bumps_patch() {
        assert_eq!(
            v("1.2.4-alpha.3").increment(ReleaseType::Prerelease, Some("beta")).unwrap(),
            v("1.2.5-beta.0")
        );
    }

    #[test]
    fn test_increment_prerelease_without_identifier_reuses_current() {
        assert_eq!(
            v("3.0.0-rc.1").increment(ReleaseType::Prerelease, None).unwrap(),
            v("3.0.0-rc.2")
        );
        assert_eq!(
            v("3.0.0").increment(ReleaseType::Prerelease, None).unwrap(),
            v("3.0.1-alpha.0")
        );
    }

    #[test]
    fn test_increment_does_not_mutate_original() {
        let original = v("1.0.0-beta.1");
        let _ = original.increment(ReleaseType::Prerelease, Some("beta"));
        assert_eq!(original, v("1.0.0-beta.1"));
    }

    #[test]
    fn test_increment_overflow_is_an_error() {
        let max = v("18446744073709551615.0.0");
        assert!(max.increment(ReleaseType::Major, None).is_err());
        assert!(max.increment(ReleaseType::Premajor, Some("alpha")).is_err());
        assert!(v("1.2.18446744073709551615")
            .increment(ReleaseType::Patch, None)
            .is_err());
        assert!(v("1.2.3-beta.18446744073709551615")
            .increment(ReleaseType::Prerelease, Some("beta"))
            .is_err());
    }

    #[test]
    fn test_version_display_round_trip() {
        assert_eq!(v("10.20.30-beta.4").to_string(), "10.20.30-beta.4");
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_as_pre_bump() {
        assert_eq!(ReleaseType::Minor.as_pre_bump(), ReleaseType::Preminor);
        assert_eq!(ReleaseType::Prerelease.as_pre_bump(), ReleaseType::Prerelease);
        assert_eq!(ReleaseType::Prepatch.as_pre_bump(), ReleaseType::Prepatch);
    }
}
