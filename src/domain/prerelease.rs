//! Pre-release tags for the release train
//!
//! Every prerelease the train produces has the shape `<identifier>.<number>`,
//! e.g. `alpha.3` or `beta.0`. Following semver precedence the identifiers
//! are compared lexically and the numeric part numerically.

use crate::error::{ReleaseTrainError, Result};
use std::cmp::Ordering;
use std::fmt;

/// Identifier used by the alpha branch
pub const ALPHA: &str = "alpha";

/// Identifier used by the beta branch
pub const BETA: &str = "beta";

/// Pre-release tag with its iteration counter
///
/// # Examples
/// - "alpha.0" -> Prerelease { identifier: "alpha", number: 0 }
/// - "beta.12" -> Prerelease { identifier: "beta", number: 12 }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prerelease {
    /// The pre-release identifier (alpha, beta, rc, ...)
    pub identifier: String,
    /// Iteration counter, starts at 0
    pub number: u64,
}

impl Prerelease {
    /// Create a new pre-release tag
    pub fn new(identifier: impl Into<String>, number: u64) -> Self {
        Prerelease {
            identifier: identifier.into(),
            number,
        }
    }

    /// Parse a pre-release tag from the part after the `-` of a version
    ///
    /// # Returns
    /// * `Ok(Prerelease)` - Parsed tag
    /// * `Err` - If the tag is not `<identifier>.<number>`
    pub fn parse(s: &str) -> Result<Self> {
        let (identifier, number) = s.rsplit_once('.').ok_or_else(|| {
            ReleaseTrainError::version(format!(
                "Unsupported pre-release '{}' - expected <identifier>.<number>",
                s
            ))
        })?;

        if identifier.is_empty()
            || !identifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ReleaseTrainError::version(format!(
                "Invalid pre-release identifier: '{}'",
                identifier
            )));
        }

        let number = number.parse::<u64>().map_err(|_| {
            ReleaseTrainError::version(format!("Invalid pre-release number: '{}'", number))
        })?;

        Ok(Prerelease::new(identifier, number))
    }

    /// Whether this tag belongs to the given identifier's track
    pub fn is(&self, identifier: &str) -> bool {
        self.identifier == identifier
    }

    /// Next iteration on the same track
    pub fn next(&self) -> Result<Self> {
        let number = self.number.checked_add(1).ok_or_else(|| {
            ReleaseTrainError::version(format!("Pre-release counter overflows after '{}'", self))
        })?;
        Ok(Prerelease::new(self.identifier.clone(), number))
    }
}

impl Ord for Prerelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier
            .cmp(&other.identifier)
            .then(self.number.cmp(&other.number))
    }
}

impl PartialOrd for Prerelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identifier, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_parse() {
        let pr = Prerelease::parse("beta.1").unwrap();
        assert_eq!(pr.identifier, "beta");
        assert_eq!(pr.number, 1);
    }

    #[test]
    fn test_prerelease_parse_hyphenated_identifier() {
        let pr = Prerelease::parse("pre-release.4").unwrap();
        assert_eq!(pr, Prerelease::new("pre-release", 4));
    }

    #[test]
    fn test_prerelease_parse_requires_number() {
        assert!(Prerelease::parse("alpha").is_err());
        assert!(Prerelease::parse("alpha.x").is_err());
        assert!(Prerelease::parse(".3").is_err());
    }

    #[test]
    fn test_prerelease_next() {
        let pr = Prerelease::new(ALPHA, 9);
        assert_eq!(pr.next().unwrap(), Prerelease::new(ALPHA, 10));
    }

    #[test]
    fn test_prerelease_ordering_identifier_first() {
        assert!(Prerelease::new(ALPHA, 9) < Prerelease::new(BETA, 0));
        assert!(Prerelease::new(BETA, 2) > Prerelease::new(BETA, 1));
    }

    #[test]
    fn test_prerelease_display() {
        assert_eq!(Prerelease::new("rc", 2).to_string(), "rc.2");
    }
}
