//! # arch-lifecycle
//!
//! Glue between the entity store and the architecture cache.
//!
//! - [`LifecycleDispatcher`] - Commits mutations and notifies the cache in commit order
//! - [`MemoryStore`] - In-memory [`EntityStore`] with unique names and outage simulation
//!
//! [`EntityStore`]: arch_core::EntityStore

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod memory;

pub use dispatcher::LifecycleDispatcher;
pub use memory::MemoryStore;
