//! Core of the runm metadata service.
//!
//! Callers name objects loosely: a filter may match partitions and object
//! types by prefix, and may leave the partition and project to the session.
//! This crate turns those filters into concrete scopes, resolves object
//! identity for upserts, validates property values against bound schemas and
//! maps every storage failure to a caller-safe [`MetadataError`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use runm_metadata::{MetadataService, RequestContext};
//! use runm_store::MetadataStore;
//! use runm_types::Session;
//!
//! # async fn example() -> runm_metadata::MetadataResult<()> {
//! let service = MetadataService::new(MetadataStore::in_memory());
//! let ctx = RequestContext::new(Session::new("alice", "acme", "us-east"));
//!
//! let object = service
//!     .object_set(&ctx, "partition: us-east\ntype: runm.machine\nname: web-01\n")
//!     .await?;
//! println!("{}", object.uuid);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod expand;
pub mod identity;
pub mod object;
pub mod payload;
pub mod property_definition;
pub mod service;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::RequestContext;
pub use error::{DeleteResponse, MetadataError, MetadataResult};
pub use payload::{ObjectDocument, PropertyDefinitionDocument};
pub use service::MetadataService;
