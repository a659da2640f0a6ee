//! In-memory entity store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arch_core::{validate_name, ArchError, ArchId, ArchResult, Architecture, EntityStore, Renamed};
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

#[derive(Debug, Default)]
struct Records {
    by_id: BTreeMap<ArchId, Architecture>,
    next_id: u64,
}

impl Records {
    fn name_taken(&self, name: &str, except: Option<ArchId>) -> bool {
        self.by_id
            .values()
            .any(|arch| arch.name() == name && Some(arch.id()) != except)
    }
}

/// An [`EntityStore`] that keeps records in memory.
///
/// Enforces unique names and assigns increasing ids. An outage can be
/// simulated with [`MemoryStore::set_available`], after which every
/// operation fails with [`ArchError::StoreError`].
#[derive(Debug)]
pub struct MemoryStore {
    records: Mutex<Records>,
    available: AtomicBool,
    fetches: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Records {
                by_id: BTreeMap::new(),
                next_id: 1,
            }),
            available: AtomicBool::new(true),
            fetches: AtomicU64::new(0),
        }
    }

    /// Create a store holding the given records.
    ///
    /// New ids continue after the highest seeded id.
    pub fn with_records(records: impl IntoIterator<Item = Architecture>) -> ArchResult<Self> {
        let store = Self::new();
        {
            let mut state = store.records.lock();
            for record in records {
                validate_name(record.name())?;
                if state.name_taken(record.name(), Some(record.id())) {
                    return Err(ArchError::DuplicateName {
                        name: record.name().to_string(),
                    });
                }
                let after = record.id().as_u64().checked_add(1).ok_or_else(|| {
                    ArchError::Configuration(format!(
                        "seed id {} leaves no id to assign",
                        record.id()
                    ))
                })?;
                state.next_id = state.next_id.max(after);
                state.by_id.insert(record.id(), record);
            }
        }
        Ok(store)
    }

    /// Simulate the store going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of `fetch_all` calls served, including failed ones.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Get a record by id.
    pub fn get(&self, id: ArchId) -> Option<Architecture> {
        self.records.lock().by_id.get(&id).cloned()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.lock().by_id.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> ArchResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ArchError::StoreError {
                message: "memory store unavailable".to_string(),
                source: None,
            })
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn fetch_all(&self) -> ArchResult<Vec<Architecture>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let records: Vec<Architecture> = self.records.lock().by_id.values().cloned().collect();
        trace!(count = records.len(), "fetched all architectures");
        Ok(records)
    }

    async fn create(&self, name: &str) -> ArchResult<Architecture> {
        self.check_available()?;
        validate_name(name)?;

        let mut state = self.records.lock();
        if state.name_taken(name, None) {
            return Err(ArchError::DuplicateName {
                name: name.to_string(),
            });
        }
        let id = ArchId::new(state.next_id);
        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or_else(|| ArchError::StoreError {
                message: "architecture id space exhausted".to_string(),
                source: None,
            })?;

        let record = Architecture::new(id, name);
        state.by_id.insert(id, record.clone());
        Ok(record)
    }

    async fn rename(&self, id: ArchId, new_name: &str) -> ArchResult<Renamed> {
        self.check_available()?;
        validate_name(new_name)?;

        let mut state = self.records.lock();
        if state.name_taken(new_name, Some(id)) {
            return Err(ArchError::DuplicateName {
                name: new_name.to_string(),
            });
        }
        let current = state.by_id.get_mut(&id).ok_or(ArchError::NotFound { id })?;

        let previous_name = current.name().to_string();
        *current = current.renamed(new_name);
        Ok(Renamed {
            previous_name,
            record: current.clone(),
        })
    }

    async fn delete(&self, id: ArchId) -> ArchResult<Architecture> {
        self.check_available()?;
        self.records
            .lock()
            .by_id
            .remove(&id)
            .ok_or(ArchError::NotFound { id })
    }
}
