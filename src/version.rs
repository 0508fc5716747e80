//! Bump levels and version arithmetic.

use crate::error::BumpError;
use clap::ValueEnum;
use semver::Version;
use std::fmt;
use std::str::FromStr;

/// Which component of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl BumpLevel {
    /// Returns the next version for this level.
    ///
    /// Lower components reset to zero; pre-release and build metadata
    /// are dropped. Fails if the incremented component would overflow.
    pub fn apply(self, version: &Version) -> Result<Version, BumpError> {
        let overflow =
            || BumpError::InvalidVersion(format!("{} cannot take a {} bump", version, self));
        Ok(match self {
            BumpLevel::Major => {
                Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
            }
            BumpLevel::Minor => Version::new(
                version.major,
                version.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            BumpLevel::Patch => Version::new(
                version.major,
                version.minor,
                version.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BumpLevel::Major => "major",
            BumpLevel::Minor => "minor",
            BumpLevel::Patch => "patch",
        }
    }
}

impl FromStr for BumpLevel {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(BumpLevel::Major),
            "minor" => Ok(BumpLevel::Minor),
            "patch" => Ok(BumpLevel::Patch),
            _ => Err(BumpError::InvalidLevel(s.to_string())),
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Git tag name for a released version.
pub fn tag_name(version: &Version) -> String {
    format!("v{}", version)
}
