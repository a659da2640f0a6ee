//! Cache configuration.

use std::time::Duration;

use arch_core::{ArchError, ArchResult, SharedEntityStore};

use crate::ArchCache;

/// Configuration for the architecture cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Initial capacity of the name mapping.
    pub initial_capacity: usize,
    /// Upper bound on the bulk load. `None` waits for the store indefinitely.
    pub population_timeout: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 32,
            population_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl CacheConfig {
    /// Check the configuration for values the cache cannot work with.
    pub fn validate(&self) -> ArchResult<()> {
        if self.population_timeout == Some(Duration::ZERO) {
            return Err(ArchError::Configuration(
                "population_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating a configured [`ArchCache`].
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use arch_cache::ArchCache;
///
/// let cache = ArchCache::builder(store)
///     .capacity(64)
///     .population_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
#[derive(Debug)]
pub struct CacheBuilder {
    store: SharedEntityStore,
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a new cache builder backed by `store`.
    pub fn new(store: SharedEntityStore) -> Self {
        Self {
            store,
            config: CacheConfig::default(),
        }
    }

    /// Set the initial capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Set the bulk load timeout.
    pub fn population_timeout(mut self, timeout: Duration) -> Self {
        self.config.population_timeout = Some(timeout);
        self
    }

    /// Wait for the store without a timeout during the bulk load.
    pub fn no_population_timeout(mut self) -> Self {
        self.config.population_timeout = None;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the cache.
    ///
    /// Returns an error if the configuration is invalid. No store access
    /// happens here; the cache populates itself on first use.
    pub fn build(self) -> ArchResult<ArchCache> {
        self.config.validate()?;
        Ok(ArchCache::with_config(self.store, self.config))
    }
}
