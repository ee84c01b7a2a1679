// SPDX-License-Identifier: MPL-2.0

//! A simple `major.minor.patch` version type for tests, demos and embedders
//! that do not bring their own.

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

/// A version made of three unsigned numbers: `major.minor.patch`.
///
/// Versions compare lexicographically on `(major, minor, patch)`. The solver
/// itself is generic over versions; this type exists for convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    /// Create a version with normal `major.minor.patch` fields.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version 0.0.0.
    pub fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Version 1.0.0.
    pub fn one() -> Self {
        Self::new(1, 0, 0)
    }

    /// The smallest version strictly higher than this one with a bumped patch
    /// number. Useful to build ranges such as `>=1.2.3, <1.2.4`.
    pub fn bump_patch(self) -> Self {
        Self::new(self.major, self.minor, self.patch + 1)
    }

    /// The smallest version with a higher minor number, `major.minor+1.0`.
    pub fn bump_minor(self) -> Self {
        Self::new(self.major, self.minor + 1, 0)
    }

    /// The smallest version with a higher major number, `major+1.0.0`.
    ///
    /// Together with [`Ranges::between`](crate::Ranges::between) this spells
    /// caret requirements: `^1.2.3` is `between(v, v.bump_major())`.
    pub fn bump_major(self) -> Self {
        Self::new(self.major + 1, 0, 0)
    }
}

impl From<(u32, u32, u32)> for SemanticVersion {
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl From<SemanticVersion> for (u32, u32, u32) {
    fn from(v: SemanticVersion) -> Self {
        (v.major, v.minor, v.patch)
    }
}

impl Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error creating [`SemanticVersion`] from a string.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionParseError {
    /// The string does not have exactly three dot-separated parts.
    #[error("version \"{full_version}\" does not have exactly three dot-separated parts")]
    NotThreeParts {
        /// The full string being parsed.
        full_version: String,
    },
    /// One of the parts is not an unsigned number.
    #[error("part \"{version_part}\" of version \"{full_version}\" is not an unsigned number")]
    ParseIntError {
        /// The full string being parsed.
        full_version: String,
        /// The part that failed to parse.
        version_part: String,
        /// The error from the standard library.
        #[source]
        source: std::num::ParseIntError,
    },
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_part = |part: &str| {
            part.parse::<u32>()
                .map_err(|source| VersionParseError::ParseIntError {
                    full_version: s.to_string(),
                    version_part: part.to_string(),
                    source,
                })
        };
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), Some(patch), None) => Ok(Self::new(
                parse_part(major)?,
                parse_part(minor)?,
                parse_part(patch)?,
            )),
            _ => Err(VersionParseError::NotThreeParts {
                full_version: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        let v: SemanticVersion = "1.22.3".parse().unwrap();
        assert_eq!(v, SemanticVersion::new(1, 22, 3));
        assert_eq!(v.to_string(), "1.22.3");
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(matches!(
            "1.0".parse::<SemanticVersion>(),
            Err(VersionParseError::NotThreeParts { .. })
        ));
        assert!(matches!(
            "1.0.0.0".parse::<SemanticVersion>(),
            Err(VersionParseError::NotThreeParts { .. })
        ));
        assert!(matches!(
            "1.x.0".parse::<SemanticVersion>(),
            Err(VersionParseError::ParseIntError { .. })
        ));
    }

    #[test]
    fn ordering_is_lexicographic() {
        let lo = SemanticVersion::new(1, 9, 9);
        let hi = SemanticVersion::new(2, 0, 0);
        assert!(lo < hi);
        assert!(lo.bump_major() == hi);
        assert!(lo < lo.bump_patch());
        assert!(lo.bump_patch() < lo.bump_minor());
    }
}
