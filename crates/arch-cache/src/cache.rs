//! The architecture cache.
//!
//! [`ArchCache`] maps architecture names to records. It populates itself
//! from the entity store on first use and is kept current by lifecycle
//! notifications sent after each committed store mutation.
//!
//! ## States
//!
//! - **Cold**: never populated, or invalidated. Notifications are skipped
//!   because the next bulk load will observe the committed state.
//! - **Loading**: a bulk load is in flight. Notifications are journaled and
//!   replayed on top of the fetched rows before the cache becomes ready.
//! - **Ready**: notifications are applied to the mapping in arrival order.
//!
//! A failed, timed out or cancelled bulk load returns the cache to Cold.

use std::sync::Arc;

use arch_core::{ArchError, ArchId, ArchResult, Architecture, SharedEntityStore};
use metrics::counter;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::config::{CacheBuilder, CacheConfig};
use crate::index::ArchIndex;
use crate::stats::CacheStats;
use crate::sync::{ConsistencyViolation, Notification, SyncOutcome};

/// Counter of bulk loads, labelled `outcome` = `ok`, `error` or `timeout`.
pub(crate) const POPULATIONS_TOTAL: &str = "arch_cache_populations_total";
/// Counter of consistency violations, labelled by [`ConsistencyViolation::kind`].
pub(crate) const CONSISTENCY_VIOLATIONS_TOTAL: &str = "arch_cache_consistency_violations_total";

#[derive(Debug)]
enum Slot {
    Cold,
    Loading(Vec<Notification>),
    Ready(Arc<ArchIndex>),
}

/// Name-indexed cache of architecture records.
///
/// ## Thread Safety
///
/// All operations are thread-safe. The mapping sits behind a read-write
/// lock and is published as an `Arc<ArchIndex>`: readers clone the `Arc`
/// and release the lock, writers copy the index if snapshots are still
/// held. A reader therefore never observes a half-applied notification,
/// and a rename replaces both keys in one critical section.
///
/// Only the bulk load awaits the store. It is serialised by an async mutex
/// so concurrent first callers share a single fetch. No lock on the mapping
/// is held across an await point.
#[derive(Debug)]
pub struct ArchCache {
    store: SharedEntityStore,
    slot: RwLock<Slot>,
    populate_lock: Mutex<()>,
    config: CacheConfig,
    stats: CacheStats,
}

impl ArchCache {
    /// Create a cache backed by `store` with default settings.
    pub fn new(store: SharedEntityStore) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    /// Create a cache with an explicit configuration.
    pub fn with_config(store: SharedEntityStore, config: CacheConfig) -> Self {
        Self {
            store,
            slot: RwLock::new(Slot::Cold),
            populate_lock: Mutex::new(()),
            config,
            stats: CacheStats::new(),
        }
    }

    /// Start building a configured cache.
    pub fn builder(store: SharedEntityStore) -> CacheBuilder {
        CacheBuilder::new(store)
    }

    /// Get the cache configuration.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics.
    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Whether the bulk load has completed.
    pub fn is_populated(&self) -> bool {
        matches!(*self.slot.read(), Slot::Ready(_))
    }

    /// Number of cached names, or 0 if not populated.
    pub fn len(&self) -> usize {
        match &*self.slot.read() {
            Slot::Ready(index) => index.len(),
            _ => 0,
        }
    }

    /// Whether the cache holds no names.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the populated mapping, loading it from the store on first use.
    ///
    /// Concurrent callers during the first load wait for the same fetch.
    /// On failure the cache stays unpopulated and the next call retries.
    pub async fn get_or_init(&self) -> ArchResult<Arc<ArchIndex>> {
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }

        let _permit = self.populate_lock.lock().await;
        // Another caller may have finished the load while we waited.
        if let Some(index) = self.snapshot() {
            return Ok(index);
        }
        self.populate().await
    }

    /// Look up an architecture by name.
    ///
    /// Returns `Ok(None)` for unknown names. The store is only consulted
    /// through the initial bulk load.
    pub async fn lookup(&self, name: &str) -> ArchResult<Option<Arc<Architecture>>> {
        let index = self.get_or_init().await?;
        let found = index.get(name).cloned();

        if found.is_some() {
            self.stats.record_hit();
            trace!(name, "cache hit");
        } else {
            self.stats.record_miss();
            trace!(name, "cache miss");
        }

        Ok(found)
    }

    /// Record a committed create.
    pub fn on_created(&self, arch: Architecture) -> SyncOutcome {
        self.notify(Notification::Created(Arc::new(arch)))
    }

    /// Record a committed rename of `id` from `old_name` to `new_name`.
    ///
    /// Ignored as stale if `old_name` no longer maps to `id`.
    pub fn on_renamed(&self, id: ArchId, old_name: &str, new_name: &str) -> SyncOutcome {
        self.notify(Notification::Renamed {
            id,
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        })
    }

    /// Record a committed update when the previous name is not known.
    ///
    /// Finds the old key by scanning for the record's id, so this is linear
    /// in the number of cached names.
    pub fn on_updated(&self, arch: Architecture) -> SyncOutcome {
        self.notify(Notification::Updated(Arc::new(arch)))
    }

    /// Record a committed delete. Deleting an absent name is a no-op.
    pub fn on_deleted(&self, name: &str) -> SyncOutcome {
        self.notify(Notification::Deleted(name.to_string()))
    }

    /// Drop the populated mapping so the next access reloads from the store.
    ///
    /// Has no effect while cold or while a bulk load is in flight. Returns
    /// whether a populated mapping was dropped.
    pub fn invalidate(&self) -> bool {
        let mut slot = self.slot.write();
        if matches!(*slot, Slot::Ready(_)) {
            *slot = Slot::Cold;
            drop(slot);
            debug!("invalidated architecture cache");
            true
        } else {
            false
        }
    }

    /// Discard the current mapping and load a fresh one.
    ///
    /// On failure the cache is left unpopulated.
    pub async fn reload(&self) -> ArchResult<Arc<ArchIndex>> {
        let _permit = self.populate_lock.lock().await;
        self.invalidate();
        self.populate().await
    }

    fn snapshot(&self) -> Option<Arc<ArchIndex>> {
        match &*self.slot.read() {
            Slot::Ready(index) => Some(Arc::clone(index)),
            _ => None,
        }
    }

    /// Run the bulk load. The caller must hold `populate_lock`.
    async fn populate(&self) -> ArchResult<Arc<ArchIndex>> {
        let loading = LoadingGuard::begin(&self.slot);
        debug!("populating architecture cache from entity store");

        let records = match self.fetch_all().await {
            Ok(records) => records,
            Err(err) => {
                let outcome = if matches!(err, ArchError::PopulationTimeout { .. }) {
                    "timeout"
                } else {
                    "error"
                };
                self.stats.record_population_failure();
                counter!(POPULATIONS_TOTAL, "outcome" => outcome).increment(1);
                warn!(error = %err, "architecture cache population failed");
                return Err(err);
            }
        };

        let fetched = records.len();
        let (mut index, load_violations) =
            ArchIndex::from_records(records, self.config.initial_capacity);

        let (index, replayed) = {
            let mut slot = self.slot.write();
            let journal = match std::mem::replace(&mut *slot, Slot::Cold) {
                Slot::Loading(journal) => journal,
                _ => Vec::new(),
            };
            // The fetch may already include journaled commits, so a conflict
            // during replay is expected and not a violation.
            let replayed: Vec<(Notification, SyncOutcome)> = journal
                .into_iter()
                .map(|notification| {
                    let outcome = match index.apply(&notification) {
                        SyncOutcome::Recovered(overridden) => {
                            trace!(%notification, %overridden, "replay overrode fetched row");
                            SyncOutcome::Applied
                        }
                        outcome => outcome,
                    };
                    (notification, outcome)
                })
                .collect();

            let index = Arc::new(index);
            *slot = Slot::Ready(Arc::clone(&index));
            (index, replayed)
        };
        loading.disarm();

        for violation in &load_violations {
            self.report_violation(violation);
        }
        for (notification, outcome) in &replayed {
            self.record(notification, outcome);
        }

        self.stats.record_population();
        counter!(POPULATIONS_TOTAL, "outcome" => "ok").increment(1);
        debug!(
            fetched,
            cached = index.len(),
            replayed = replayed.len(),
            "populated architecture cache"
        );

        Ok(index)
    }

    async fn fetch_all(&self) -> ArchResult<Vec<Architecture>> {
        let fetch = self.store.fetch_all();
        let result = match self.config.population_timeout {
            Some(timeout) => tokio::time::timeout(timeout, fetch)
                .await
                .map_err(|_| ArchError::PopulationTimeout { timeout })?,
            None => fetch.await,
        };
        result.map_err(|err| ArchError::population("bulk load from entity store failed", err))
    }

    fn notify(&self, notification: Notification) -> SyncOutcome {
        let outcome = {
            let mut slot = self.slot.write();
            match &mut *slot {
                Slot::Cold => SyncOutcome::Skipped,
                Slot::Loading(journal) => {
                    journal.push(notification.clone());
                    SyncOutcome::Journaled
                }
                Slot::Ready(index) => Arc::make_mut(index).apply(&notification),
            }
        };

        self.record(&notification, &outcome);
        outcome
    }

    fn record(&self, notification: &Notification, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Applied => {
                self.stats.record_applied();
                debug!(%notification, "updated architecture cache");
            }
            SyncOutcome::Unchanged => {
                trace!(%notification, "architecture cache already current");
            }
            SyncOutcome::Stale => {
                self.stats.record_stale();
                debug!(%notification, "ignored stale notification");
            }
            SyncOutcome::Recovered(violation) => {
                self.stats.record_applied();
                self.report_violation(violation);
                debug!(%notification, "updated architecture cache over conflicting entry");
            }
            SyncOutcome::Journaled => {
                self.stats.record_journaled();
                trace!(%notification, "journaled notification during population");
            }
            SyncOutcome::Skipped => {
                self.stats.record_skipped();
                trace!(%notification, "cache not populated, skipped notification");
            }
        }
    }

    fn report_violation(&self, violation: &ConsistencyViolation) {
        self.stats.record_violation();
        counter!(CONSISTENCY_VIOLATIONS_TOTAL, "kind" => violation.kind())
            .increment(1);
        warn!(kind = violation.kind(), %violation, "architecture cache consistency violation");
    }
}

/// Marks the cache as loading and restores it to cold unless disarmed.
///
/// Dropping the population future (cancellation or timeout) drops the
/// guard, so an aborted load never leaves the cache stuck in Loading.
struct LoadingGuard<'a> {
    slot: &'a RwLock<Slot>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn begin(slot: &'a RwLock<Slot>) -> Self {
        *slot.write() = Slot::Loading(Vec::new());
        Self { slot, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = self.slot.write();
        let discarded = match &*slot {
            Slot::Loading(journal) => journal.len(),
            _ => return,
        };
        *slot = Slot::Cold;
        drop(slot);
        trace!(discarded, "population aborted, discarding journal");
    }
}
