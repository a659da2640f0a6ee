//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache operations.
///
/// All counters are atomic and can be safely accessed from multiple threads.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of lookups that found an entry.
    lookup_hits: AtomicU64,
    /// Number of lookups that found nothing.
    lookup_misses: AtomicU64,
    /// Number of completed bulk loads.
    populations: AtomicU64,
    /// Number of failed or timed out bulk loads.
    population_failures: AtomicU64,
    /// Number of notifications that changed the mapping.
    notifications_applied: AtomicU64,
    /// Number of stale notifications ignored.
    notifications_stale: AtomicU64,
    /// Number of notifications buffered during a bulk load.
    notifications_journaled: AtomicU64,
    /// Number of notifications skipped while cold.
    notifications_skipped: AtomicU64,
    /// Number of consistency violations observed.
    consistency_violations: AtomicU64,
}

impl CacheStats {
    /// Create new cache statistics.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_population(&self) {
        self.populations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_population_failure(&self) {
        self.population_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_applied(&self) {
        self.notifications_applied.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_stale(&self) {
        self.notifications_stale.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_journaled(&self) {
        self.notifications_journaled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_skipped(&self) {
        self.notifications_skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_violation(&self) {
        self.consistency_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total lookup hits.
    #[inline]
    pub fn lookup_hits(&self) -> u64 {
        self.lookup_hits.load(Ordering::Relaxed)
    }

    /// Get total lookup misses.
    #[inline]
    pub fn lookup_misses(&self) -> u64 {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    /// Get total completed bulk loads.
    #[inline]
    pub fn populations(&self) -> u64 {
        self.populations.load(Ordering::Relaxed)
    }

    /// Get total failed bulk loads.
    #[inline]
    pub fn population_failures(&self) -> u64 {
        self.population_failures.load(Ordering::Relaxed)
    }

    /// Get total notifications that changed the mapping.
    #[inline]
    pub fn notifications_applied(&self) -> u64 {
        self.notifications_applied.load(Ordering::Relaxed)
    }

    /// Get total stale notifications ignored.
    #[inline]
    pub fn notifications_stale(&self) -> u64 {
        self.notifications_stale.load(Ordering::Relaxed)
    }

    /// Get total notifications buffered during a bulk load.
    #[inline]
    pub fn notifications_journaled(&self) -> u64 {
        self.notifications_journaled.load(Ordering::Relaxed)
    }

    /// Get total notifications skipped while cold.
    #[inline]
    pub fn notifications_skipped(&self) -> u64 {
        self.notifications_skipped.load(Ordering::Relaxed)
    }

    /// Get total consistency violations observed.
    #[inline]
    pub fn consistency_violations(&self) -> u64 {
        self.consistency_violations.load(Ordering::Relaxed)
    }

    /// Calculate lookup hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.lookup_hits() as f64;
        let total = hits + self.lookup_misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        for counter in [
            &self.lookup_hits,
            &self.lookup_misses,
            &self.populations,
            &self.population_failures,
            &self.notifications_applied,
            &self.notifications_stale,
            &self.notifications_journaled,
            &self.notifications_skipped,
            &self.consistency_violations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
