//! Architecture records and their identifiers.
//!
//! An [`Architecture`] has an immutable identity ([`ArchId`]) and a mutable
//! display name. The name is what callers look records up by, so it must be
//! unique among live records and is validated by [`validate_name`].

use std::fmt;

use crate::ArchError;

/// Stable identifier of an architecture record.
///
/// Assigned by the entity store on create and never reused for a different
/// record while the original is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchId(u64);

impl ArchId {
    /// Create an id from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ArchId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ArchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A persisted architecture record, e.g. `x86_64` or `armv7l`.
///
/// Associations held by the store (repositories, flags, download stats) are
/// not part of this type. It carries only what name-based lookups need.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Architecture {
    id: ArchId,
    name: String,
}

impl Architecture {
    /// Create a new architecture record.
    #[must_use]
    pub fn new(id: ArchId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Get the stable id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ArchId {
        self.id
    }

    /// Get the current name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return a copy of this record carrying a new name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Validate an architecture name.
///
/// Names must be non-empty and must not contain whitespace or `/`, since
/// they appear in repository paths.
pub fn validate_name(name: &str) -> Result<(), ArchError> {
    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.chars().any(char::is_whitespace) {
        "name cannot contain whitespace"
    } else if name.contains('/') {
        "name cannot contain '/'"
    } else {
        return Ok(());
    };

    Err(ArchError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
