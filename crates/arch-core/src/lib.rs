//! # arch-core
//!
//! Core types, traits, and error handling shared by the architecture cache crates.
//!
//! This crate provides the foundational types used across all other crates:
//!
//! - [`Architecture`] - A persisted architecture record (stable id, mutable name)
//! - [`ArchId`] - Stable identifier of an architecture record
//! - [`EntityStore`] - Trait for the durable system of record
//! - [`ArchError`] - Error type for store and cache operations
//!
//! ## Example
//!
//! ```rust
//! use arch_core::{ArchId, Architecture};
//!
//! let arch = Architecture::new(ArchId::new(1), "x86_64");
//! let renamed = arch.renamed("amd64");
//!
//! assert_eq!(renamed.id(), arch.id());
//! assert_eq!(renamed.name(), "amd64");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod error;
mod store;

pub use entity::{validate_name, ArchId, Architecture};
pub use error::ArchError;
pub use store::{EntityStore, Renamed, SharedEntityStore};

/// Result type alias using [`ArchError`].
pub type Result<T> = std::result::Result<T, ArchError>;

/// Alias for Result, matching the naming used by dependent crates.
pub type ArchResult<T> = Result<T>;
