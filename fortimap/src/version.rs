//! Versioned field availability
//!
//! The version token is whatever the device reports (`v7.2.0`). Flatten and
//! expand never interpret it themselves; they hand it to an [`AvailabilityGate`].

use crate::error::{MapError, Result};
use crate::schema::FieldSpec;
use std::fmt;

/// Firmware version, compared component-wise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses `v7.2.0`, `7.2.0` or `7.2`; missing components are zero
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = || MapError::InvalidVersion(token.to_string());
        let trimmed = token.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut parts = [0u32; 3];
        let mut count = 0;
        for part in digits.split('.') {
            if count == parts.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            parts[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Inclusive range of versions a field exists in; open ends are unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionRange {
    pub since: Option<Version>,
    pub until: Option<Version>,
}

impl VersionRange {
    pub fn since(version: Version) -> Self {
        Self {
            since: Some(version),
            until: None,
        }
    }

    pub fn until(version: Version) -> Self {
        Self {
            since: None,
            until: Some(version),
        }
    }

    pub fn between(since: Version, until: Version) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }

    pub fn contains(&self, version: Version) -> bool {
        self.since.map_or(true, |s| version >= s) && self.until.map_or(true, |u| version <= u)
    }
}

/// Decides whether a field exists on a given firmware version
pub trait AvailabilityGate: Send + Sync {
    fn is_available(&self, field: &FieldSpec, version: &str) -> Result<bool>;
}

/// Default gate, driven by each field's declared [`VersionRange`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionRangeGate;

impl AvailabilityGate for VersionRangeGate {
    fn is_available(&self, field: &FieldSpec, version: &str) -> Result<bool> {
        match field.availability {
            None => Ok(true),
            Some(range) => Ok(range.contains(Version::parse(version)?)),
        }
    }
}

/// Shared check used by flatten and expand
pub(crate) fn field_available(
    gate: &dyn AvailabilityGate,
    field: &FieldSpec,
    version: Option<&str>,
) -> Result<bool> {
    match version {
        None => Ok(true),
        Some(v) if v.is_empty() => Ok(true),
        Some(v) => gate.is_available(field, v),
    }
}
