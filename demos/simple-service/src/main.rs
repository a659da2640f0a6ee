//! Simple service example
//!
//! This example demonstrates a service that:
//! - Seeds an in-memory entity store with a few architectures
//! - Serves lookups from a lazily populated cache
//! - Routes create, rename and delete through the lifecycle dispatcher
//! - Survives a store outage during the first load
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run -p simple-service
//! ```

use std::sync::Arc;
use std::time::Duration;

use archcache::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Configuration for the example service.
struct Config {
    /// Architectures present in the store at startup.
    seed: Vec<&'static str>,
    /// Bound on the initial cache load.
    population_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: vec!["x86_64", "i586"],
            population_timeout: Duration::from_secs(5),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    info!("{}", archcache::version::version_string());

    let config = Config::default();

    let store = Arc::new(MemoryStore::with_records(
        config
            .seed
            .iter()
            .enumerate()
            .map(|(i, name)| Architecture::new(ArchId::new(i as u64 + 1), *name)),
    )?);
    let cache = Arc::new(
        ArchCache::builder(store.clone())
            .population_timeout(config.population_timeout)
            .build()?,
    );
    let dispatcher = LifecycleDispatcher::new(store.clone(), cache.clone());

    // The first load fails while the store is down and is retried afterwards.
    store.set_available(false);
    if let Err(err) = cache.lookup("x86_64").await {
        warn!(error = %err, transient = err.is_transient(), "lookup failed");
    }
    store.set_available(true);

    report(&cache, "x86_64").await?;
    report(&cache, "i586").await?;

    let arm = dispatcher.create("armv7l").await?;
    report(&cache, "armv7l").await?;

    dispatcher.rename(arm.id(), "armv7hl").await?;
    report(&cache, "armv7l").await?;
    report(&cache, "armv7hl").await?;

    // A late notification for a rename that has already been superseded.
    let outcome = cache.on_renamed(arm.id(), "armv7l", "armv6l");
    info!(?outcome, "replayed stale rename");

    let i586 = cache.lookup("i586").await?.ok_or("i586 missing")?;
    dispatcher.delete(i586.id()).await?;
    report(&cache, "i586").await?;

    let index = cache.get_or_init().await?;
    let mut names: Vec<&str> = index.names().collect();
    names.sort_unstable();
    info!(?names, "final cache contents");

    let stats = cache.stats();
    info!(
        populations = stats.populations(),
        population_failures = stats.population_failures(),
        applied = stats.notifications_applied(),
        stale = stats.notifications_stale(),
        hit_rate = stats.hit_rate(),
        store_fetches = store.fetch_count(),
        "cache statistics"
    );

    Ok(())
}

async fn report(cache: &ArchCache, name: &str) -> ArchResult<()> {
    match cache.lookup(name).await? {
        Some(arch) => info!(name, id = %arch.id(), "resolved"),
        None => info!(name, "not found"),
    }
    Ok(())
}
