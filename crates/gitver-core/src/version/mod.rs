//! Version model and bump transitions.
//!
//! A [`Version`] is `major.minor.patch` with an optional pre-release slot
//! rendered as `-alphaN`. Versions are plain values: every bump returns a new
//! [`Version`] and leaves the original untouched.
//!
//! ```
//! use gitver_core::version::{BumpOp, Version};
//!
//! let current = Version::parse("1.2.3-alpha4").unwrap();
//! assert_eq!(current.apply(BumpOp::Major).to_string(), "2.0.0");
//! assert_eq!(current.apply(BumpOp::Prerelease).to_string(), "1.2.3-alpha5");
//! ```

mod prerelease;

pub use prerelease::PreRelease;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Literal that introduces the pre-release suffix.
pub const PRERELEASE_TAG: &str = "alpha";

/// Errors from version parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text does not follow `major.minor.patch[-alphaN]`.
    #[error("invalid version {text:?}: {reason}")]
    Format {
        /// The offending text, as given.
        text: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl VersionError {
    fn format(text: &str, reason: impl Into<String>) -> Self {
        Self::Format {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// One of the five bump operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BumpOp {
    /// `X.0.0`, pre-release cleared.
    Major,
    /// `x.Y.0`, pre-release cleared.
    Minor,
    /// `x.y.Z`, pre-release cleared.
    Patch,
    /// Advance the `-alphaN` counter.
    #[value(alias = "alpha", alias = "subpatch")]
    Prerelease,
    /// Drop the `-alphaN` suffix.
    #[value(alias = "unalpha")]
    ClearPrerelease,
}

impl BumpOp {
    /// Every operation, in slot order.
    pub const ALL: &[Self] = &[
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::Prerelease,
        Self::ClearPrerelease,
    ];
}

impl fmt::Display for BumpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
            Self::Prerelease => write!(f, "prerelease"),
            Self::ClearPrerelease => write!(f, "clear-prerelease"),
        }
    }
}

/// A semantic version with an optional `-alphaN` pre-release slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Version {
    /// Major slot.
    pub major: u64,
    /// Minor slot.
    pub minor: u64,
    /// Patch slot.
    pub patch: u64,
    /// Pre-release slot.
    pub prerelease: PreRelease,
}

impl Version {
    /// A release version with no pre-release slot.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: PreRelease::NONE,
        }
    }

    /// The same version with its pre-release counter set to `counter`.
    #[must_use]
    pub const fn with_prerelease(mut self, counter: u64) -> Self {
        self.prerelease = PreRelease::new(counter);
        self
    }

    /// Parse `major.minor.patch` or `major.minor.patch-alphaN`.
    ///
    /// Surrounding whitespace and quotes are ignored. Numeric slots that are
    /// empty or non-numeric read as `0`; the overall shape is strict.
    pub fn parse(text: &str) -> VersionResult<Self> {
        let cleaned = text.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if cleaned.is_empty() {
            return Err(VersionError::format(text, "empty version"));
        }

        let parts: Vec<&str> = cleaned.split('.').collect();
        let [major, minor, patch_raw] = parts.as_slice() else {
            return Err(VersionError::format(
                text,
                format!("expected 3 dot-separated parts, found {}", parts.len()),
            ));
        };

        let (patch, prerelease) = match patch_raw.split_once('-') {
            None => (*patch_raw, PreRelease::NONE),
            Some((patch, suffix)) => (patch, parse_suffix(text, suffix)?),
        };

        Ok(Self {
            major: lenient_number(major),
            minor: lenient_number(minor),
            patch: lenient_number(patch),
            prerelease,
        })
    }

    /// Apply one bump operation, returning the new version.
    #[must_use]
    pub const fn apply(self, op: BumpOp) -> Self {
        match op {
            BumpOp::Major => self.bump_major(),
            BumpOp::Minor => self.bump_minor(),
            BumpOp::Patch => self.bump_patch(),
            BumpOp::Prerelease => self.bump_prerelease(),
            BumpOp::ClearPrerelease => self.clear_prerelease(),
        }
    }

    /// `X+1.0.0`.
    #[must_use]
    pub const fn bump_major(self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }

    /// `x.Y+1.0`.
    #[must_use]
    pub const fn bump_minor(self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }

    /// `x.y.Z+1`.
    #[must_use]
    pub const fn bump_patch(self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }

    /// Advance the pre-release counter, allocating `alpha0` when absent.
    #[must_use]
    pub const fn bump_prerelease(mut self) -> Self {
        self.prerelease = self.prerelease.incremented();
        self
    }

    /// Drop the pre-release slot.
    #[must_use]
    pub const fn clear_prerelease(mut self) -> Self {
        self.prerelease = self.prerelease.cleared();
        self
    }

    /// Whether this is a pre-release version.
    pub const fn is_prerelease(&self) -> bool {
        self.prerelease.is_present()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}{}", self.major, self.minor, self.patch, self.prerelease)
    }
}

impl std::str::FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse the part after the patch hyphen: `alpha` followed by digits.
fn parse_suffix(text: &str, suffix: &str) -> VersionResult<PreRelease> {
    let Some(digits) = suffix.strip_prefix(PRERELEASE_TAG) else {
        return Err(VersionError::format(
            text,
            format!("pre-release suffix must start with {PRERELEASE_TAG:?}"),
        ));
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(VersionError::format(
            text,
            format!("pre-release counter {digits:?} is not a number"),
        ));
    }
    Ok(PreRelease::new(lenient_number(digits)))
}

/// Numeric slot that reads empty or malformed text as `0`.
fn lenient_number(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}
