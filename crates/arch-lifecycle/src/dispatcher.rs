//! Lifecycle dispatch.
//!
//! The [`LifecycleDispatcher`] is the only write path to the entity store.
//! Each mutation commits first and then, before the call returns, sends the
//! matching notification to the cache. Mutations are serialised by an async
//! commit lock, so the cache observes notifications in commit order across
//! all records. This matters for names: a rename freeing `x` followed by a
//! create claiming `x` must reach the cache in that order.

use std::sync::Arc;

use arch_cache::{ArchCache, SyncOutcome};
use arch_core::{ArchId, ArchResult, Architecture, Renamed, SharedEntityStore};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Commits architecture mutations and keeps the cache in step.
///
/// ## Cancellation
///
/// The notification is sent synchronously once the store call returns. If
/// the caller drops the future while the store call is still pending, the
/// commit may or may not have happened; call [`ArchCache::invalidate`] in
/// that case to force a reload.
#[derive(Debug)]
pub struct LifecycleDispatcher {
    store: SharedEntityStore,
    cache: Arc<ArchCache>,
    commit_lock: Mutex<()>,
}

impl LifecycleDispatcher {
    /// Create a dispatcher writing to `store` and notifying `cache`.
    ///
    /// `cache` must be backed by the same store.
    pub fn new(store: SharedEntityStore, cache: Arc<ArchCache>) -> Self {
        Self {
            store,
            cache,
            commit_lock: Mutex::new(()),
        }
    }

    /// Get the cache this dispatcher notifies.
    #[inline]
    pub fn cache(&self) -> &Arc<ArchCache> {
        &self.cache
    }

    /// Create an architecture and register it in the cache.
    pub async fn create(&self, name: &str) -> ArchResult<Architecture> {
        let _commit = self.commit_lock.lock().await;
        let record = self.store.create(name).await?;

        debug!(id = %record.id(), name = record.name(), "committed architecture create");
        let outcome = self.cache.on_created(record.clone());
        report(&outcome, record.id());
        Ok(record)
    }

    /// Rename an architecture and move its cache entry.
    pub async fn rename(&self, id: ArchId, new_name: &str) -> ArchResult<Architecture> {
        let _commit = self.commit_lock.lock().await;
        let Renamed {
            previous_name,
            record,
        } = self.store.rename(id, new_name).await?;

        debug!(
            id = %id,
            from = %previous_name,
            to = record.name(),
            "committed architecture rename"
        );
        let outcome = self.cache.on_renamed(id, &previous_name, record.name());
        report(&outcome, id);
        Ok(record)
    }

    /// Delete an architecture and drop its cache entry.
    pub async fn delete(&self, id: ArchId) -> ArchResult<Architecture> {
        let _commit = self.commit_lock.lock().await;
        let record = self.store.delete(id).await?;

        debug!(id = %id, name = record.name(), "committed architecture delete");
        let outcome = self.cache.on_deleted(record.name());
        report(&outcome, id);
        Ok(record)
    }
}

fn report(outcome: &SyncOutcome, id: ArchId) {
    // Commits are serialised, so a stale rename here means the cache drifted
    // from the store outside this dispatcher.
    if matches!(outcome, SyncOutcome::Stale) {
        warn!(id = %id, "cache did not match committed state");
    }
}
