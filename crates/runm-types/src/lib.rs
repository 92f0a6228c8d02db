//! Foundation types for the runm metadata service.
//!
//! Every other runm crate depends on `runm-types`.
//!
//! # Key Types
//!
//! - [`Partition`]: top-level isolation boundary
//! - [`ObjectType`]: classification code with a name uniqueness [`ObjectTypeScope`]
//! - [`Object`]: the generic record with tags and string properties
//! - [`PropertyDefinition`]: schema bound to a (partition, type, key) triple
//! - [`Session`]: caller identity and default scope
//! - [`ObjectFilter`] / [`ObjectListFilter`]: user filters and their expanded form
//! - [`Condition`] / [`ConditionSet`]: predicate algebra used to search storage

pub mod conditions;
pub mod error;
pub mod filter;
pub mod object;
pub mod object_type;
pub mod partition;
pub mod property;
pub mod session;

pub use conditions::{matches_any, Condition, ConditionKind, ConditionSet, Conditioned, EntityView, Op};
pub use error::TypeError;
pub use filter::{
    ObjectFilter, ObjectListFilter, ObjectTypeFilter, PartitionFilter, PropertyDefinitionFilter,
    PropertyDefinitionListFilter,
};
pub use object::{Object, ObjectDraft, ObjectWithReferences};
pub use object_type::{ObjectType, ObjectTypeScope};
pub use partition::Partition;
pub use property::{
    Permission, PropertyDefinition, PropertyDefinitionWithReferences, PropertyPermission,
    PropertySchema, SchemaFormat, SchemaType,
};
pub use session::Session;
