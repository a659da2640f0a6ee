//! Load tests for the architecture cache.
//!
//! These tests verify the cache under sustained concurrent use:
//! - Many readers against a populated cache
//! - Notification throughput with outstanding snapshots
//! - A large bulk load
//!
//! Run with: `cargo test --package integration-tests --test load_tests -- --nocapture`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use archcache::prelude::*;
use tokio::sync::Barrier;

fn store_with(count: u64) -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::with_records(
            (1..=count).map(|i| Architecture::new(ArchId::new(i), format!("arch-{}", i))),
        )
        .expect("generated names are unique"),
    )
}

/// Populate a cache with 5,000 architectures and read each one back.
#[tokio::test]
async fn test_large_population() {
    let count = 5_000;
    let store = store_with(count);
    let cache = ArchCache::new(store.clone());

    let start = Instant::now();
    let index = cache.get_or_init().await.unwrap();
    println!("Populated {} architectures in {:?}", index.len(), start.elapsed());
    assert_eq!(index.len(), count as usize);

    let start = Instant::now();
    for i in 1..=count {
        assert!(cache.lookup(&format!("arch-{}", i)).await.unwrap().is_some());
    }
    let elapsed = start.elapsed();
    println!(
        "Looked up {} names in {:?} ({:.2} µs/op)",
        count,
        elapsed,
        elapsed.as_micros() as f64 / count as f64
    );

    assert_eq!(store.fetch_count(), 1);
    assert_eq!(cache.stats().hit_rate(), 1.0);
}

/// Readers and a renaming writer run together; every read must resolve.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_readers_during_renames() {
    let store = store_with(64);
    let cache = Arc::new(ArchCache::new(store));
    cache.get_or_init().await.unwrap();

    let num_readers = 16;
    let barrier = Arc::new(Barrier::new(num_readers + 1));
    let reads = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::new();
    for r in 0..num_readers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let reads = Arc::clone(&reads);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            // arch-1 is the only record being renamed, so skip it.
            let name = format!("arch-{}", 2 + (r % 63));
            for _ in 0..500 {
                assert!(cache.lookup(&name).await.unwrap().is_some());
                reads.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    let writer = {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            let id = ArchId::new(1);
            for _ in 0..500 {
                cache.on_renamed(id, "arch-1", "arch-1-renamed");
                cache.on_renamed(id, "arch-1-renamed", "arch-1");
                tokio::task::yield_now().await;
            }
        })
    };

    let start = Instant::now();
    for handle in handles {
        handle.await.unwrap();
    }
    writer.await.unwrap();
    println!(
        "{} reads with concurrent renames in {:?}",
        reads.load(Ordering::Relaxed),
        start.elapsed()
    );

    assert_eq!(reads.load(Ordering::Relaxed), (num_readers * 500) as u64);
    assert_eq!(cache.len(), 64);
    assert_eq!(cache.stats().notifications_applied(), 1_000);
}

/// Many independent creates and deletes through the dispatcher.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_dispatch_throughput() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(ArchCache::new(store.clone()));
    cache.get_or_init().await.unwrap();
    let dispatcher = Arc::new(LifecycleDispatcher::new(store.clone(), cache.clone()));

    let start = Instant::now();
    let tasks = (0..500).map(|i| {
        let dispatcher = Arc::clone(&dispatcher);
        tokio::spawn(async move {
            let arch = dispatcher.create(&format!("arch-{}", i)).await.unwrap();
            if i % 5 == 0 {
                dispatcher.delete(arch.id()).await.unwrap();
            }
        })
    });
    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }
    println!("Dispatched 600 mutations in {:?}", start.elapsed());

    assert_eq!(cache.len(), 400);
    assert_eq!(cache.len(), store.len());
    assert_eq!(cache.stats().consistency_violations(), 0);
}
