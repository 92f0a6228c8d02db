//! Storage collaborator for the runm metadata service.
//!
//! Metadata records live in an ordered key-value store. This crate defines
//! the store interface the service depends on, an in-memory implementation,
//! and the typed layer that maps partitions, object types, objects and
//! property definitions onto keys.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`]: `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Records are JSON values; secondary indexes map names to UUIDs.
//! 2. Uniqueness keys are claimed with compare-and-swap before the record is
//!    written, so at most one concurrent create of an identity succeeds.
//! 3. Updates swap against the previously read record and fail on a stale read.
//! 4. Every call can be bounded by a caller-supplied [`Deadline`].
//! 5. Backend errors are propagated, never silently ignored.

pub mod deadline;
pub mod error;
pub mod keys;
pub mod memory;
pub mod metadata;
pub mod traits;

pub use deadline::Deadline;
pub use error::{StoreError, StoreResult};
pub use keys::KeyLayout;
pub use memory::InMemoryKvStore;
pub use metadata::MetadataStore;
pub use traits::KvStore;
