//! Cache integration tests.
//!
//! Walks the lookup and notification scenarios against a `MemoryStore`
//! and checks the uniqueness, reachability, rename and delete guarantees.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use archcache::prelude::*;

fn seeded() -> (Arc<MemoryStore>, Arc<ArchCache>) {
    let store = Arc::new(
        MemoryStore::with_records([
            Architecture::new(ArchId::new(1), "x86_64"),
            Architecture::new(ArchId::new(2), "i586"),
        ])
        .expect("seed records are valid"),
    );
    let cache = Arc::new(ArchCache::new(store.clone()));
    (store, cache)
}

async fn id_of(cache: &ArchCache, name: &str) -> Option<u64> {
    cache
        .lookup(name)
        .await
        .expect("lookup should succeed")
        .map(|arch| arch.id().as_u64())
}

#[tokio::test]
async fn scenario_a_first_lookup_populates_once() {
    let (store, cache) = seeded();
    assert_eq!(store.fetch_count(), 0);

    assert_eq!(id_of(&cache, "x86_64").await, Some(1));
    assert_eq!(store.fetch_count(), 1);

    assert_eq!(id_of(&cache, "i586").await, Some(2));
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn scenarios_b_through_e() {
    let (store, cache) = seeded();
    cache.get_or_init().await.unwrap();

    // B: create
    cache.on_created(Architecture::new(ArchId::new(3), "armv7l"));
    assert_eq!(id_of(&cache, "armv7l").await, Some(3));

    // C: rename
    cache.on_renamed(ArchId::new(3), "armv7l", "armv7hl");
    assert_eq!(id_of(&cache, "armv7l").await, None);
    assert_eq!(id_of(&cache, "armv7hl").await, Some(3));

    // D: delete, then re-create
    cache.on_deleted("i586");
    assert_eq!(id_of(&cache, "i586").await, None);
    cache.on_created(Architecture::new(ArchId::new(2), "i586"));
    assert_eq!(id_of(&cache, "i586").await, Some(2));

    // E: stale rename is ignored
    let outcome = cache.on_renamed(ArchId::new(3), "armv7l", "armv6l");
    assert_eq!(outcome, SyncOutcome::Stale);
    assert_eq!(id_of(&cache, "armv6l").await, None);
    assert_eq!(id_of(&cache, "armv7hl").await, Some(3));

    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn delete_is_final_until_recreated() {
    let (_store, cache) = seeded();
    cache.get_or_init().await.unwrap();

    cache.on_deleted("x86_64");
    for _ in 0..3 {
        assert_eq!(id_of(&cache, "x86_64").await, None);
    }
    // Unrelated notifications do not resurrect it.
    cache.on_created(Architecture::new(ArchId::new(5), "aarch64"));
    cache.on_renamed(ArchId::new(2), "i586", "i686");
    assert_eq!(id_of(&cache, "x86_64").await, None);

    assert_eq!(cache.on_deleted("x86_64"), SyncOutcome::Unchanged);
}

#[tokio::test]
async fn names_stay_unique_under_mixed_notifications() {
    let (_store, cache) = seeded();
    cache.get_or_init().await.unwrap();

    // Deterministic pseudo-random mix of creates, renames and deletes
    // over a small name space so collisions are frequent.
    let names = ["a", "b", "c", "d", "e"];
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        seed
    };

    for step in 0..2_000u64 {
        let name = names[(next() % names.len() as u64) as usize];
        match next() % 3 {
            0 => {
                cache.on_created(Architecture::new(ArchId::new(100 + step), name));
            }
            1 => {
                let target = names[(next() % names.len() as u64) as usize];
                let index = cache.get_or_init().await.unwrap();
                if let Some(current) = index.get(name) {
                    cache.on_renamed(current.id(), name, target);
                }
            }
            _ => {
                cache.on_deleted(name);
            }
        }

        let index = cache.get_or_init().await.unwrap();
        assert!(index.iter().all(|(key, arch)| key == arch.name()));
        assert!(index.len() <= names.len() + 2);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_access_shares_one_load() {
    let (store, cache) = seeded();

    let tasks = (0..32).map(|_| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_or_init().await })
    });
    let snapshots: Vec<Arc<ArchIndex>> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(store.fetch_count(), 1);
    assert!(snapshots
        .iter()
        .all(|snapshot| Arc::ptr_eq(snapshot, &snapshots[0])));
    assert_eq!(snapshots[0].len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rename_is_atomic_for_readers() {
    let (_store, cache) = seeded();
    cache.get_or_init().await.unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let observations = Arc::new(AtomicUsize::new(0));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let done = Arc::clone(&done);
        let observations = Arc::clone(&observations);
        readers.push(tokio::spawn(async move {
            while !done.load(Ordering::Acquire) {
                let index = cache.get_or_init().await.unwrap();
                let old = index.get("i586").map(|a| a.id());
                let new = index.get("i686").map(|a| a.id());
                // Exactly one of the two names resolves at any instant.
                assert!(old.is_some() ^ new.is_some());
                assert_eq!(old.or(new), Some(ArchId::new(2)));
                observations.fetch_add(1, Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        }));
    }

    let writer = {
        let cache = Arc::clone(&cache);
        tokio::task::spawn_blocking(move || {
            for _ in 0..500 {
                assert_eq!(
                    cache.on_renamed(ArchId::new(2), "i586", "i686"),
                    SyncOutcome::Applied
                );
                assert_eq!(
                    cache.on_renamed(ArchId::new(2), "i686", "i586"),
                    SyncOutcome::Applied
                );
            }
        })
    };
    writer.await.unwrap();
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.await.unwrap();
    }
    assert!(observations.load(Ordering::Relaxed) > 0);
}

#[tokio::test]
async fn store_outage_is_retryable() {
    let (store, cache) = seeded();
    store.set_available(false);

    let err = cache.lookup("x86_64").await.unwrap_err();
    assert!(matches!(err, ArchError::PopulationFailed { .. }));
    assert!(!cache.is_populated());

    let err = cache.get_or_init().await.unwrap_err();
    assert!(err.is_transient());

    store.set_available(true);
    assert_eq!(id_of(&cache, "x86_64").await, Some(1));
    assert_eq!(store.fetch_count(), 3);
    assert_eq!(cache.stats().population_failures(), 2);
    assert_eq!(cache.stats().populations(), 1);
}

#[tokio::test]
async fn conflicting_create_prefers_latest_notification() {
    let (_store, cache) = seeded();
    cache.get_or_init().await.unwrap();

    let outcome = cache.on_created(Architecture::new(ArchId::new(8), "i586"));

    assert!(matches!(
        outcome.violation(),
        Some(ConsistencyViolation::DuplicateName { .. })
    ));
    assert_eq!(id_of(&cache, "i586").await, Some(8));
    assert_eq!(cache.stats().consistency_violations(), 1);
}

#[tokio::test]
async fn builder_rejects_invalid_config() {
    let (store, _cache) = seeded();

    let result = ArchCache::builder(store)
        .population_timeout(std::time::Duration::ZERO)
        .build();

    assert!(matches!(result, Err(ArchError::Configuration(_))));
}
