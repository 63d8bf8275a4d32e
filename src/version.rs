//! @ai:module:intent Semantic version parsing and bump calculation for prompts
//! @ai:module:layer domain
//! @ai:module:public_api SemanticVersion, VersionBump, next_version
//! @ai:module:stateless true

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::OnceLock;

/// MAJOR.MINOR.PATCH with an optional -LABEL or -LABEL.N pre-release suffix
const VERSION_PATTERN: &str = r"^(\d+)\.(\d+)\.(\d+)(?:-([A-Za-z]+)(?:\.(\d+))?)?$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern is valid"))
}

/// @ai:intent Kind of semantic version bump
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    /// @ai:intent Convert bump kind to string representation
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }
}

impl std::str::FromStr for VersionBump {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(Error::InvalidVersion(format!(
                "unknown bump type '{}' (expected major, minor or patch)",
                other
            ))),
        }
    }
}

/// @ai:intent A parsed semantic version for a prompt snapshot
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre_label: Option<String>,
    pub pre_number: Option<u32>,
}

impl SemanticVersion {
    /// @ai:intent Parse a version string like "1.2.3" or "1.2.3-RC.1"
    /// @ai:post Err(InvalidVersion) when the string does not match the pattern
    /// @ai:effects pure
    pub fn parse(input: &str) -> Result<Self> {
        let captures = version_regex()
            .captures(input)
            .ok_or_else(|| Error::InvalidVersion(input.to_string()))?;

        let number = |i: usize| -> u32 {
            captures
                .get(i)
                .map(|m| m.as_str().parse().unwrap_or(0))
                .unwrap_or(0)
        };

        Ok(Self {
            major: number(1),
            minor: number(2),
            patch: number(3),
            pre_label: captures.get(4).map(|m| m.as_str().to_string()),
            pre_number: captures.get(5).and_then(|m| m.as_str().parse().ok()),
        })
    }

    /// @ai:intent Apply a bump, clearing any pre-release suffix
    /// @ai:effects pure
    pub fn bump(&self, bump: VersionBump) -> Self {
        let (major, minor, patch) = match bump {
            VersionBump::Major => (self.major + 1, 0, 0),
            VersionBump::Minor => (self.major, self.minor + 1, 0),
            VersionBump::Patch => (self.major, self.minor, self.patch + 1),
        };

        Self {
            major,
            minor,
            patch,
            pre_label: None,
            pre_number: None,
        }
    }
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if let Some(label) = &self.pre_label {
            write!(f, "-{}", label)?;
            if let Some(number) = self.pre_number {
                write!(f, ".{}", number)?;
            }
        }

        Ok(())
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    /// Pre-releases sort before the release they precede (SemVer 2.0.0)
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_label, &other.pre_label) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b).then(self.pre_number.cmp(&other.pre_number)),
            })
    }
}

/// @ai:intent Calculate the next version string for a bump
/// @ai:post no current version (or an unparseable one) starts at 1.0.0
/// @ai:effects pure
pub fn next_version(current: Option<&str>, bump: VersionBump) -> String {
    match current.and_then(|v| SemanticVersion::parse(v).ok()) {
        Some(version) => version.bump(bump).to_string(),
        None => "1.0.0".to_string(),
    }
}
