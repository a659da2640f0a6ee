//! # arch-cache
//!
//! In-memory, name-indexed cache of architecture records.
//!
//! This crate provides the caching layer in front of an [`EntityStore`]:
//!
//! - [`ArchCache`] - Lazily populated cache kept current by lifecycle notifications
//! - [`ArchIndex`] - Immutable snapshot of the name → record mapping
//! - [`SyncOutcome`] - What a lifecycle notification did to the mapping
//! - [`CacheStats`] - Atomic counters for lookups, loads and notifications
//!
//! ## Key Design Decisions
//!
//! - One bulk load on first use; concurrent first callers share it
//! - A failed, timed out or cancelled load leaves the cache cold for retry
//! - The mapping is published as `Arc<ArchIndex>` and copied on write
//! - A rename removes the old key and inserts the new one under one write lock
//! - Consistency violations are logged and counted, never returned as errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arch_cache::ArchCache;
//!
//! let cache = ArchCache::new(store);
//!
//! // First lookup loads every record from the store
//! let x86 = cache.lookup("x86_64").await?;
//!
//! // After a committed rename in the store
//! cache.on_renamed(arch.id(), "armv7l", "armv7hl");
//! ```
//!
//! [`EntityStore`]: arch_core::EntityStore

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod index;
mod stats;
mod sync;

pub use cache::ArchCache;
pub use config::{CacheBuilder, CacheConfig};
pub use index::ArchIndex;
pub use stats::CacheStats;
pub use sync::{ConsistencyViolation, SyncOutcome};
