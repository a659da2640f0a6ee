//! # archcache
//!
//! Name-indexed architecture cache kept consistent with an entity store.
//!
//! The cache loads every architecture from the store on first use and then
//! serves lookups from memory. Every committed create, rename and delete is
//! forwarded to it by the lifecycle dispatcher, in commit order.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use archcache::prelude::*;
//!
//! let store = Arc::new(MemoryStore::new());
//! let cache = Arc::new(ArchCache::new(store.clone()));
//! let dispatcher = LifecycleDispatcher::new(store, cache.clone());
//!
//! let arch = dispatcher.create("armv7l").await?;
//! dispatcher.rename(arch.id(), "armv7hl").await?;
//!
//! assert!(cache.lookup("armv7l").await?.is_none());
//! ```
//!
//! ## Architecture
//!
//! - `arch-core` - Records, ids, the `EntityStore` trait and errors
//! - `arch-cache` - The cache, its snapshots, configuration and statistics
//! - `arch-lifecycle` - The commit-ordered dispatcher and an in-memory store
//!
//! This crate (`archcache`) re-exports all public APIs for convenience.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use arch_cache as cache;
pub use arch_core as core;
pub use arch_lifecycle as lifecycle;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use archcache::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use arch_core::{
        ArchError, ArchId, ArchResult, Architecture, EntityStore, Renamed, SharedEntityStore,
    };

    // Cache types
    pub use arch_cache::{
        ArchCache, ArchIndex, CacheBuilder, CacheConfig, CacheStats, ConsistencyViolation,
        SyncOutcome,
    };

    // Lifecycle types
    pub use arch_lifecycle::{LifecycleDispatcher, MemoryStore};
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("archcache {} (MSRV {})", VERSION, MSRV)
    }
}
