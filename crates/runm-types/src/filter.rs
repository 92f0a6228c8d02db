//! User-supplied filters and their fully-resolved counterparts.
//!
//! Users send [`ObjectFilter`] / [`PropertyDefinitionFilter`] values whose
//! partition and object type parts may match many records by prefix. The
//! metadata service expands those into [`ObjectListFilter`] /
//! [`PropertyDefinitionListFilter`] values, each naming exactly one partition
//! and at most one object type.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::{Condition, ConditionSet, Conditioned};
use crate::object::Object;
use crate::object_type::ObjectType;
use crate::partition::Partition;

fn term_matches(candidate: &str, search: &str, use_prefix: bool) -> bool {
    if use_prefix {
        candidate.starts_with(search)
    } else {
        candidate == search
    }
}

/// Matches partitions by UUID or name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub use_prefix: bool,
}

impl PartitionFilter {
    pub fn exact(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            use_prefix: false,
        }
    }

    pub fn prefix(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            use_prefix: true,
        }
    }

    pub fn matches(&self, partition: &Partition) -> bool {
        if self.search.is_empty() {
            return true;
        }
        term_matches(&partition.name, &self.search, self.use_prefix)
            || term_matches(&partition.uuid.to_string(), &self.search, self.use_prefix)
    }
}

/// Matches object types by code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectTypeFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub use_prefix: bool,
}

impl ObjectTypeFilter {
    pub fn exact(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            use_prefix: false,
        }
    }

    pub fn prefix(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            use_prefix: true,
        }
    }

    pub fn matches(&self, object_type: &ObjectType) -> bool {
        self.search.is_empty() || term_matches(&object_type.code, &self.search, self.use_prefix)
    }
}

/// A possibly-partial object filter as supplied by a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectTypeFilter>,
    /// Search term on the object's UUID or name.
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub use_prefix: bool,
}

impl ObjectFilter {
    pub fn with_partition(mut self, filter: PartitionFilter) -> Self {
        self.partition = Some(filter);
        self
    }

    pub fn with_object_type(mut self, filter: ObjectTypeFilter) -> Self {
        self.object_type = Some(filter);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>, use_prefix: bool) -> Self {
        self.search = search.into();
        self.use_prefix = use_prefix;
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }
}

/// Builds the UUID-or-name condition for a search term: terms that parse as
/// a UUID match the UUID exactly, anything else matches the name.
fn search_condition(search: &str, use_prefix: bool) -> Option<Condition> {
    if search.is_empty() {
        return None;
    }
    if let Ok(uuid) = Uuid::parse_str(search) {
        return Some(Condition::uuid_equal(uuid));
    }
    Some(if use_prefix {
        Condition::name_prefix(search)
    } else {
        Condition::name_equal(search)
    })
}

/// A concrete object filter scoped to exactly one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectListFilter {
    pub partition: Partition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub use_prefix: bool,
}

impl ObjectListFilter {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            object_type: None,
            project: None,
            search: String::new(),
            use_prefix: false,
        }
    }

    /// Partition, type and search terms as a condition set.
    ///
    /// The project term is not included; see [`Self::matches`].
    pub fn conditions(&self) -> ConditionSet {
        let mut set = ConditionSet::new().with(Condition::partition_equal(&self.partition));
        if let Some(object_type) = &self.object_type {
            set.push(Condition::object_type_equal(object_type));
        }
        if let Some(c) = search_condition(&self.search, self.use_prefix) {
            set.push(c);
        }
        set
    }

    /// Returns `true` if the object falls inside this filter.
    ///
    /// The project term only restricts objects that belong to a project;
    /// objects of partition-scoped types carry none and stay visible.
    pub fn matches(&self, object: &Object) -> bool {
        if !self.conditions().matches(object) {
            return false;
        }
        match (&self.project, &object.project) {
            (Some(want), Some(have)) => want == have,
            _ => true,
        }
    }
}

impl fmt::Display for ObjectListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectListFilter(partition={}", self.partition.uuid)?;
        if let Some(t) = &self.object_type {
            write!(f, ",object_type={}", t.code)?;
        }
        if let Some(p) = &self.project {
            write!(f, ",project={p}")?;
        }
        if !self.search.is_empty() {
            write!(f, ",search={},use_prefix={}", self.search, self.use_prefix)?;
        }
        f.write_str(")")
    }
}

/// A possibly-partial property definition filter as supplied by a caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinitionFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectTypeFilter>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub use_prefix: bool,
}

/// A concrete property definition filter scoped to exactly one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinitionListFilter {
    pub partition: Partition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub use_prefix: bool,
}

impl PropertyDefinitionListFilter {
    pub fn conditions(&self) -> ConditionSet {
        let mut set = ConditionSet::new().with(Condition::partition_equal(&self.partition));
        if let Some(object_type) = &self.object_type {
            set.push(Condition::object_type_equal(object_type));
        }
        if !self.key.is_empty() {
            set.push(if self.use_prefix {
                Condition::property_key_prefix(&self.key)
            } else {
                Condition::property_key_equal(&self.key)
            });
        }
        set
    }

    pub fn matches<E: Conditioned + ?Sized>(&self, entity: &E) -> bool {
        self.conditions().matches(entity)
    }
}

impl fmt::Display for PropertyDefinitionListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyDefinitionListFilter(partition={}", self.partition.uuid)?;
        if let Some(t) = &self.object_type {
            write!(f, ",object_type={}", t.code)?;
        }
        if !self.key.is_empty() {
            write!(f, ",key={},use_prefix={}", self.key, self.use_prefix)?;
        }
        f.write_str(")")
    }
}
