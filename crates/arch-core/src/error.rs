//! Error types for store and cache operations.
//!
//! This module provides [`ArchError`], the error type shared by the entity
//! store, the cache and the lifecycle dispatcher.

use std::time::Duration;

use crate::ArchId;

/// Error type for architecture store and cache operations.
///
/// Population failures are transient: the cache stays unpopulated and the
/// next access retries the full load. See [`ArchError::is_transient`].
///
/// # Example
///
/// ```rust
/// use arch_core::ArchError;
///
/// let io_err = std::io::Error::other("connection refused");
/// let err = ArchError::population("store unavailable", io_err);
///
/// assert!(err.is_transient());
/// assert!(err.to_string().contains("store unavailable"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ArchError {
    /// The initial bulk load against the entity store failed.
    #[error("cache population failed: {message}")]
    PopulationFailed {
        /// Description of the failure.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The initial bulk load did not complete within the configured timeout.
    #[error("cache population timed out after {timeout:?}")]
    PopulationTimeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// An entity store operation failed.
    #[error("store error: {message}")]
    StoreError {
        /// Description of the store error.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No record exists for the given id.
    #[error("architecture not found: {id}")]
    NotFound {
        /// The id that was requested.
        id: ArchId,
    },

    /// Another live record already uses this name.
    #[error("architecture name already in use: {name}")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// Name failed validation.
    #[error("invalid architecture name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ArchError {
    /// Create a population error from any error type.
    pub fn population<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PopulationFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a store error from any error type.
    pub fn store<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether retrying the same operation later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::PopulationFailed { .. } | Self::PopulationTimeout { .. } | Self::StoreError { .. }
        )
    }
}
