use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::{Conditioned, EntityView};
use crate::object_type::ObjectType;
use crate::partition::Partition;

/// The generic stored record.
///
/// `uuid` is assigned once by storage at creation and never changes. Name
/// uniqueness is governed by the object type's scope, never global.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// UUID of the owning partition.
    pub partition: Uuid,
    /// Code of the object's type.
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub uuid: Uuid,
    pub name: String,
    /// Unstructured tags. Order is preserved but not significant.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Object {
    /// Tags as an order-insensitive set.
    pub fn tag_set(&self) -> BTreeSet<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

impl Conditioned for Object {
    fn view(&self) -> EntityView<'_> {
        EntityView {
            partition: Some(&self.partition),
            object_type: Some(&self.object_type),
            uuid: Some(&self.uuid),
            name: Some(&self.name),
            project: self.project.as_deref(),
            property_key: None,
        }
    }
}

/// A stored object together with its already-resolved partition and type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectWithReferences {
    pub partition: Partition,
    pub object_type: ObjectType,
    pub object: Object,
}

impl Conditioned for ObjectWithReferences {
    fn view(&self) -> EntityView<'_> {
        self.object.view()
    }
}

/// A validated object that may not exist in storage yet.
///
/// Produced from a decoded payload after its partition and object type have
/// been resolved and its properties validated. The UUID is only present when
/// the caller supplied one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDraft {
    pub partition: Partition,
    pub object_type: ObjectType,
    pub uuid: Option<Uuid>,
    pub name: String,
    pub project: Option<String>,
    pub tags: Vec<String>,
    pub properties: BTreeMap<String, String>,
}

impl ObjectDraft {
    /// Bind the draft to a concrete UUID.
    pub fn into_object(self, uuid: Uuid) -> ObjectWithReferences {
        let object = Object {
            partition: self.partition.uuid,
            object_type: self.object_type.code.clone(),
            project: self.project,
            uuid,
            name: self.name,
            tags: self.tags,
            properties: self.properties,
        };
        ObjectWithReferences {
            partition: self.partition,
            object_type: self.object_type,
            object,
        }
    }
}
