//! Engine version parsing and the minimum-version gate.
//!
//! The store relies on `INSERT ... ON CONFLICT ... DO UPDATE`, which SQLite
//! first shipped in 3.24.0. Versions are compared numerically, component by
//! component, so `3.9.0` sorts below `3.24.0`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Minimum engine version supporting atomic upsert-on-conflict.
pub const REQUIRED_ENGINE_VERSION: &str = "3.24.0";

/// A `major.minor.patch` version triple.
///
/// # Examples
///
/// ```
/// use pw_core::EngineVersion;
///
/// let v: EngineVersion = "3.45.1".parse().unwrap();
/// assert_eq!(v.as_tuple(), (3, 45, 1));
/// assert_eq!(v.to_string(), "3.45.1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a dotted version string into exactly three numeric parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedVersion`] when the string has more or fewer
    /// than three parts, or when any part is not a non-negative integer.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(Error::MalformedVersion(raw.to_string()));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::MalformedVersion(raw.to_string()));
            }
            *slot = part
                .parse()
                .map_err(|_| Error::MalformedVersion(raw.to_string()))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }

    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    /// Returns `true` when `self >= required`, comparing major, then minor,
    /// then patch.
    pub fn is_at_least(&self, required: &EngineVersion) -> bool {
        version_at_least(self.as_tuple(), required.as_tuple())
    }
}

impl FromStr for EngineVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Component-wise numeric comparison of two version triples.
pub fn version_at_least(installed: (u32, u32, u32), required: (u32, u32, u32)) -> bool {
    installed >= required
}

/// Checks an installed version string against a required one.
///
/// Both strings are parsed first, so a malformed string fails with
/// [`Error::MalformedVersion`] even when the other side would have passed.
///
/// # Errors
///
/// Returns [`Error::IncompatibleEngine`] when `installed < required`.
///
/// # Examples
///
/// ```
/// use pw_core::{Error, check_engine_version};
///
/// assert!(check_engine_version("3.45.1", "3.24.0").is_ok());
/// assert!(matches!(
///     check_engine_version("3.23.9", "3.24.0"),
///     Err(Error::IncompatibleEngine { .. })
/// ));
/// ```
pub fn check_engine_version(installed: &str, required: &str) -> Result<EngineVersion> {
    let installed_version = EngineVersion::parse(installed)?;
    let required_version = EngineVersion::parse(required)?;

    if !installed_version.is_at_least(&required_version) {
        return Err(Error::IncompatibleEngine {
            installed: installed_version.to_string(),
            required: required_version.to_string(),
        });
    }

    Ok(installed_version)
}
