//! Lifecycle notification outcomes and consistency violations.

use std::fmt;
use std::sync::Arc;

use arch_core::{ArchId, Architecture};

/// Result of applying a lifecycle notification to the cache.
///
/// Notifications never fail: inconsistencies are recovered in favour of the
/// notification and reported through [`SyncOutcome::Recovered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The mapping changed.
    Applied,
    /// The mapping already reflected the notification.
    Unchanged,
    /// A rename whose old name no longer maps to the named id. Ignored.
    Stale,
    /// The notification was applied over conflicting state.
    Recovered(ConsistencyViolation),
    /// A bulk load is in flight; the notification will be replayed on top of it.
    Journaled,
    /// The cache has not been populated; the bulk load will observe the change.
    Skipped,
}

impl SyncOutcome {
    /// Whether the notification changed the mapping.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Applied | Self::Recovered(_))
    }

    /// The violation, if one was recovered from.
    #[must_use]
    pub fn violation(&self) -> Option<&ConsistencyViolation> {
        match self {
            Self::Recovered(violation) => Some(violation),
            _ => None,
        }
    }
}

/// A cache state that contradicted an authoritative notification or load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyViolation {
    /// A create named an entity whose name already mapped to a different id.
    #[error("create of {incoming} found {name:?} already mapped to {existing}")]
    DuplicateName {
        /// The contested name.
        name: String,
        /// Id that held the name before.
        existing: ArchId,
        /// Id named by the notification.
        incoming: ArchId,
    },

    /// A rename targeted a name already mapped to a different id.
    #[error("rename of {incoming} found {name:?} already mapped to {existing}")]
    RenameTargetTaken {
        /// The contested name.
        name: String,
        /// Id that held the name before.
        existing: ArchId,
        /// Id named by the notification.
        incoming: ArchId,
    },

    /// A create named an id that was still cached under another name.
    #[error("create of {id} found it still mapped under {stale_name:?}")]
    IdUnderOtherName {
        /// The created id.
        id: ArchId,
        /// Name the id was cached under before.
        stale_name: String,
    },

    /// The bulk load returned more than one record for a name.
    #[error("bulk load returned {name:?} for both {dropped} and {kept}")]
    DuplicateInStore {
        /// The duplicated name.
        name: String,
        /// Id that was kept (the later row).
        kept: ArchId,
        /// Id that was dropped.
        dropped: ArchId,
    },
}

impl ConsistencyViolation {
    /// Short label used to tag metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "duplicate_name",
            Self::RenameTargetTaken { .. } => "rename_target_taken",
            Self::IdUnderOtherName { .. } => "id_under_other_name",
            Self::DuplicateInStore { .. } => "duplicate_in_store",
        }
    }
}

/// A notification buffered while a bulk load is in flight.
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Created(Arc<Architecture>),
    Renamed {
        id: ArchId,
        old_name: String,
        new_name: String,
    },
    Updated(Arc<Architecture>),
    Deleted(String),
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(arch) => write!(f, "create {arch}"),
            Self::Renamed {
                id,
                old_name,
                new_name,
            } => write!(f, "rename {id} {old_name} -> {new_name}"),
            Self::Updated(arch) => write!(f, "update {arch}"),
            Self::Deleted(name) => write!(f, "delete {name}"),
        }
    }
}
