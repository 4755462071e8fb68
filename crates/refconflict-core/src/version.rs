//! Four-part module versions and inclusive version ranges.
//!
//! Module versions have the shape `major.minor.build.revision`. Components
//! compare as unsigned integers, left to right, so the derived ordering on
//! [`ModuleVersion`] is the version ordering. Binding-redirect ranges use the
//! configuration syntax `low-high` (both inclusive) or a single version.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A four-part module version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

/// Error returned when a version or version range cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("empty version string")]
    Empty,
    #[error("version '{0}' must have between two and four components")]
    ComponentCount(String),
    #[error("invalid version component '{component}' in '{input}'")]
    Component { input: String, component: String },
    #[error("version range '{0}' has a lower bound above its upper bound")]
    InvertedRange(String),
}

impl ModuleVersion {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for ModuleVersion {
    type Err = VersionParseError;

    /// Parse `a.b`, `a.b.c` or `a.b.c.d`; missing components are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty);
        }
        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=4).contains(&parts.len()) {
            return Err(VersionParseError::ComponentCount(s.to_string()));
        }
        let mut components = [0u32; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse::<u32>()
                .map_err(|_| VersionParseError::Component {
                    input: s.to_string(),
                    component: part.to_string(),
                })?;
        }
        let [major, minor, build, revision] = components;
        Ok(Self::new(major, minor, build, revision))
    }
}

/// An inclusive range of module versions, as used by `oldVersion` in a
/// binding redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub low: ModuleVersion,
    pub high: ModuleVersion,
}

impl VersionRange {
    pub fn new(low: ModuleVersion, high: ModuleVersion) -> Self {
        Self { low, high }
    }

    /// A range containing exactly one version.
    pub fn exact(version: ModuleVersion) -> Self {
        Self {
            low: version,
            high: version,
        }
    }

    /// Check if a version lies within this range (both bounds inclusive).
    pub fn contains(&self, version: &ModuleVersion) -> bool {
        self.low <= *version && *version <= self.high
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

impl FromStr for VersionRange {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            Some((low, high)) => {
                let range = Self::new(low.parse()?, high.parse()?);
                if range.low > range.high {
                    return Err(VersionParseError::InvertedRange(s.to_string()));
                }
                Ok(range)
            }
            None => Ok(Self::exact(s.parse()?)),
        }
    }
}
