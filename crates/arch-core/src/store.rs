//! Entity store trait.
//!
//! The [`EntityStore`] is the durable system of record for architectures.
//! The cache only ever reads from it through [`EntityStore::fetch_all`];
//! mutations go through the lifecycle dispatcher, which notifies the cache
//! after each successful commit.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{ArchId, Architecture, Result};

/// Outcome of a committed rename.
///
/// Carries the name the record had before the update so that the cache can
/// drop the old key without scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Renamed {
    /// Name before the rename committed.
    pub previous_name: String,
    /// The record as committed.
    pub record: Architecture,
}

/// Durable store of architecture records.
///
/// Implementations must enforce name uniqueness among live records and
/// return an error (never a partial result) from `fetch_all` when the read
/// cannot complete.
#[async_trait]
pub trait EntityStore: Send + Sync + fmt::Debug {
    /// Fetch every live record.
    async fn fetch_all(&self) -> Result<Vec<Architecture>>;

    /// Create a record with the given name, assigning a fresh id.
    async fn create(&self, name: &str) -> Result<Architecture>;

    /// Change the name of an existing record.
    async fn rename(&self, id: ArchId, new_name: &str) -> Result<Renamed>;

    /// Delete a record, returning it as it was before deletion.
    async fn delete(&self, id: ArchId) -> Result<Architecture>;
}

/// Shared handle to an entity store.
pub type SharedEntityStore = Arc<dyn EntityStore>;
