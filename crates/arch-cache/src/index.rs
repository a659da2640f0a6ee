//! Name-keyed index of architecture records.
//!
//! [`ArchIndex`] is the mapping the cache publishes. Readers hold it behind
//! an `Arc`, so a snapshot handed out by the cache never changes; the cache
//! mutates a private copy when snapshots are still outstanding.

use std::collections::HashMap;
use std::sync::Arc;

use arch_core::{ArchId, Architecture};

use crate::sync::{ConsistencyViolation, Notification, SyncOutcome};

/// Immutable view of the name → architecture mapping.
#[derive(Debug, Clone, Default)]
pub struct ArchIndex {
    entries: HashMap<String, Arc<Architecture>>,
}

impl ArchIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Build an index from the rows of a bulk load.
    ///
    /// Duplicate names keep the later row and are reported.
    pub(crate) fn from_records(
        records: Vec<Architecture>,
        capacity: usize,
    ) -> (Self, Vec<ConsistencyViolation>) {
        let mut index = Self::with_capacity(capacity.max(records.len()));
        let mut violations = Vec::new();

        for record in records {
            let record = Arc::new(record);
            if let Some(previous) = index
                .entries
                .insert(record.name().to_string(), Arc::clone(&record))
            {
                if previous.id() != record.id() {
                    violations.push(ConsistencyViolation::DuplicateInStore {
                        name: record.name().to_string(),
                        kept: record.id(),
                        dropped: previous.id(),
                    });
                }
            }
        }

        (index, violations)
    }

    /// Get the record currently registered under `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Arc<Architecture>> {
        self.entries.get(name)
    }

    /// Check if `name` is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Find the record with the given id.
    ///
    /// Scans all entries.
    pub fn find_by_id(&self, id: ArchId) -> Option<&Arc<Architecture>> {
        self.entries.values().find(|arch| arch.id() == id)
    }

    /// Number of registered names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Architecture>)> + '_ {
        self.entries.iter().map(|(name, arch)| (name.as_str(), arch))
    }

    pub(crate) fn apply(&mut self, notification: &Notification) -> SyncOutcome {
        match notification {
            Notification::Created(arch) => self.apply_created(Arc::clone(arch)),
            Notification::Renamed {
                id,
                old_name,
                new_name,
            } => self.apply_renamed(*id, old_name, new_name),
            Notification::Updated(arch) => self.apply_updated(Arc::clone(arch)),
            Notification::Deleted(name) => self.apply_deleted(name),
        }
    }

    fn apply_created(&mut self, arch: Arc<Architecture>) -> SyncOutcome {
        let incoming = arch.id();
        // One key per id: any other name still holding it is superseded.
        let mut stale_name = None;
        self.entries.retain(|name, current| {
            let keep = current.id() != incoming || name == arch.name();
            if !keep && stale_name.is_none() {
                stale_name = Some(name.clone());
            }
            keep
        });

        // A name collision is reported over a superseded key.
        match self.entries.insert(arch.name().to_string(), Arc::clone(&arch)) {
            Some(previous) if previous.id() != incoming => {
                SyncOutcome::Recovered(ConsistencyViolation::DuplicateName {
                    name: arch.name().to_string(),
                    existing: previous.id(),
                    incoming,
                })
            }
            previous => match stale_name {
                Some(stale_name) => SyncOutcome::Recovered(
                    ConsistencyViolation::IdUnderOtherName {
                        id: incoming,
                        stale_name,
                    },
                ),
                None if previous.is_some() => SyncOutcome::Unchanged,
                None => SyncOutcome::Applied,
            },
        }
    }

    fn apply_renamed(&mut self, id: ArchId, old_name: &str, new_name: &str) -> SyncOutcome {
        // The rename only speaks for `id`: if the old key moved on, a later
        // notification already superseded this one.
        let current = match self.entries.get(old_name) {
            Some(arch) if arch.id() == id => Arc::clone(arch),
            _ => return SyncOutcome::Stale,
        };
        if old_name == new_name {
            return SyncOutcome::Unchanged;
        }

        self.entries.remove(old_name);
        let renamed = Arc::new(current.renamed(new_name));
        self.insert_displacing(renamed)
    }

    fn apply_updated(&mut self, arch: Arc<Architecture>) -> SyncOutcome {
        let id = arch.id();
        let mut moved = false;
        self.entries.retain(|name, current| {
            let keep = current.id() != id || name == arch.name();
            moved |= !keep;
            keep
        });

        let unchanged = !moved
            && self
                .entries
                .get(arch.name())
                .is_some_and(|current| current.id() == id);
        if unchanged {
            return SyncOutcome::Unchanged;
        }
        self.insert_displacing(arch)
    }

    fn apply_deleted(&mut self, name: &str) -> SyncOutcome {
        match self.entries.remove(name) {
            Some(_) => SyncOutcome::Applied,
            None => SyncOutcome::Unchanged,
        }
    }

    fn insert_displacing(&mut self, arch: Arc<Architecture>) -> SyncOutcome {
        let incoming = arch.id();
        match self.entries.insert(arch.name().to_string(), Arc::clone(&arch)) {
            Some(previous) if previous.id() != incoming => {
                SyncOutcome::Recovered(ConsistencyViolation::RenameTargetTaken {
                    name: arch.name().to_string(),
                    existing: previous.id(),
                    incoming,
                })
            }
            _ => SyncOutcome::Applied,
        }
    }
}
