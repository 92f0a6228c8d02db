use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::{Conditioned, EntityView};
use crate::object_type::ObjectType;
use crate::partition::Partition;

/// Primitive type a property value may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String format constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    DateTime,
    Date,
    Time,
    Email,
    IdnEmail,
    Hostname,
    IdnHostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    Iri,
    IriReference,
    UriTemplate,
}

impl SchemaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
            Self::Email => "email",
            Self::IdnEmail => "idn-email",
            Self::Hostname => "hostname",
            Self::IdnHostname => "idn-hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Uri => "uri",
            Self::UriReference => "uri-reference",
            Self::Iri => "iri",
            Self::IriReference => "iri-reference",
            Self::UriTemplate => "uri-template",
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage representation of a property value schema.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Allowed primitive types. Empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<SchemaFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl PropertySchema {
    /// Returns `true` if values of type `t` are allowed (an empty type set
    /// allows every type).
    pub fn allows(&self, t: SchemaType) -> bool {
        self.types.is_empty() || self.types.contains(&t)
    }

    /// Returns `true` if numeric constraints apply to this schema's values.
    pub fn is_numeric(&self) -> bool {
        self.allows(SchemaType::Integer) || self.allows(SchemaType::Number)
    }
}

/// Read/write permission bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(u8);

impl Permission {
    pub const NONE: Self = Self(0);
    pub const READ: Self = Self(1);
    pub const WRITE: Self = Self(2);
    pub const READ_WRITE: Self = Self(3);

    pub fn can_read(&self) -> bool {
        self.0 & Self::READ.0 != 0
    }

    pub fn can_write(&self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

/// Grants a permission on a property to a project and/or role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPermission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub permission: Permission,
}

/// Schema and permissions bound to a (partition, object type, key) triple.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub uuid: Uuid,
    /// UUID of the owning partition.
    pub partition: Uuid,
    /// Code of the object type.
    pub object_type: String,
    pub key: String,
    /// Objects of this type must carry the property.
    #[serde(default)]
    pub required: bool,
    pub schema: PropertySchema,
    #[serde(default)]
    pub permissions: Vec<PropertyPermission>,
}

impl Conditioned for PropertyDefinition {
    fn view(&self) -> EntityView<'_> {
        EntityView {
            partition: Some(&self.partition),
            object_type: Some(&self.object_type),
            uuid: Some(&self.uuid),
            property_key: Some(&self.key),
            ..EntityView::default()
        }
    }
}

/// A property definition with its partition and object type resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinitionWithReferences {
    pub partition: Partition,
    pub object_type: ObjectType,
    pub definition: PropertyDefinition,
}

impl Conditioned for PropertyDefinitionWithReferences {
    fn view(&self) -> EntityView<'_> {
        self.definition.view()
    }
}
