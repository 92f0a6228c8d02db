//! Human-authored documents accepted by the set operations.
//!
//! Payloads are YAML (JSON documents parse too). Decoding only checks
//! shape; references are resolved by the services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use uuid::Uuid;

use runm_schema::{PermissionDocument, SchemaDocument};

use crate::error::{MetadataError, MetadataResult};

/// An object as written by a caller.
///
/// ```yaml
/// partition: us-east
/// type: runm.machine
/// name: web-01
/// project: acme
/// tags: [web, prod]
/// properties:
///   arch: x86_64
///   cores: 8
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDocument {
    #[serde(default)]
    pub partition: String,
    #[serde(default, alias = "type")]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Scalar values only; numbers and booleans are kept as their text.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl ObjectDocument {
    pub fn decode(payload: &str) -> MetadataResult<Self> {
        let doc: Self = serde_yaml::from_str(payload)
            .map_err(|e| MetadataError::InvalidInput(format!("malformed object document: {e}")))?;
        if doc.partition.is_empty() {
            return Err(MetadataError::InvalidInput("partition is required".into()));
        }
        if doc.object_type.is_empty() {
            return Err(MetadataError::InvalidInput("object type is required".into()));
        }
        if doc.name.is_empty() && doc.uuid.is_none() {
            return Err(MetadataError::InvalidInput(
                "name is required when no uuid is given".into(),
            ));
        }
        Ok(doc)
    }

    /// Property values as strings.
    pub fn properties(&self) -> MetadataResult<BTreeMap<String, String>> {
        self.properties
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => {
                        return Err(MetadataError::InvalidInput(format!(
                            "property '{key}' must be a scalar value"
                        )))
                    }
                };
                Ok((key.clone(), text))
            })
            .collect()
    }
}

/// A property definition as written by a caller.
///
/// ```yaml
/// partition: us-east
/// type: runm.machine
/// key: arch
/// required: true
/// schema:
///   type: [string]
///   pattern: "^(x86_64|arm64)$"
/// permissions:
///   - project: acme
///     permission: rw
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinitionDocument {
    #[serde(default)]
    pub partition: String,
    #[serde(default, alias = "type")]
    pub object_type: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: SchemaDocument,
    #[serde(default)]
    pub permissions: Vec<PermissionDocument>,
}

impl PropertyDefinitionDocument {
    pub fn decode(payload: &str) -> MetadataResult<Self> {
        let doc: Self = serde_yaml::from_str(payload).map_err(|e| {
            MetadataError::InvalidInput(format!("malformed property definition document: {e}"))
        })?;
        if doc.partition.is_empty() {
            return Err(MetadataError::InvalidInput("partition is required".into()));
        }
        if doc.object_type.is_empty() {
            return Err(MetadataError::InvalidInput("object type is required".into()));
        }
        if doc.key.is_empty() {
            return Err(MetadataError::InvalidInput("key is required".into()));
        }
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Object documents
    // -----------------------------------------------------------------------
    #[test]
    fn decodes_object_with_scalar_properties() {
        let doc = ObjectDocument::decode(
            "partition: p1\ntype: runm.machine\nname: web-01\ntags: [a, b]\nproperties:\n  arch: x86_64\n  cores: 8\n  spot: false\n",
        )
        .unwrap();
        assert_eq!(doc.object_type, "runm.machine");
        assert_eq!(doc.tags, vec!["a", "b"]);
        let props = doc.properties().unwrap();
        assert_eq!(props["cores"], "8");
        assert_eq!(props["spot"], "false");
        assert_eq!(props["arch"], "x86_64");
    }

    #[test]
    fn json_payloads_are_accepted() {
        let doc = ObjectDocument::decode(
            r#"{"partition": "p1", "object_type": "runm.provider", "name": "rack-1"}"#,
        )
        .unwrap();
        assert_eq!(doc.name, "rack-1");
        assert!(doc.project.is_none());
    }

    #[test]
    fn missing_required_fields_are_invalid_input() {
        let err = ObjectDocument::decode("type: runm.machine\nname: x\n").unwrap_err();
        assert_eq!(err, MetadataError::InvalidInput("partition is required".into()));
        let err = ObjectDocument::decode("partition: p1\nname: x\n").unwrap_err();
        assert_eq!(err, MetadataError::InvalidInput("object type is required".into()));
        let err = ObjectDocument::decode("partition: p1\ntype: t\n").unwrap_err();
        assert_eq!(
            err,
            MetadataError::InvalidInput("name is required when no uuid is given".into())
        );
    }

    #[test]
    fn uuid_stands_in_for_name() {
        let doc = ObjectDocument::decode(
            "partition: p1\ntype: t\nuuid: 0191a2b3-c4d5-7e6f-8a9b-0c1d2e3f4a5b\n",
        )
        .unwrap();
        assert!(doc.name.is_empty());
        assert!(doc.uuid.is_some());
    }

    #[test]
    fn malformed_yaml_is_invalid_input() {
        let err = ObjectDocument::decode("partition: [unclosed").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn nested_property_values_are_rejected() {
        let doc = ObjectDocument::decode(
            "partition: p1\ntype: t\nname: n\nproperties:\n  nested:\n    a: 1\n",
        )
        .unwrap();
        let err = doc.properties().unwrap_err();
        assert!(err.to_string().contains("nested"));
    }

    // -----------------------------------------------------------------------
    // Property definition documents
    // -----------------------------------------------------------------------
    #[test]
    fn decodes_property_definition() {
        let doc = PropertyDefinitionDocument::decode(
            "partition: p1\ntype: runm.machine\nkey: arch\nrequired: true\nschema:\n  type: [string]\n  max_length: 8\npermissions:\n  - project: acme\n    permission: rw\n",
        )
        .unwrap();
        assert!(doc.required);
        assert_eq!(doc.schema.max_length, Some(8));
        assert_eq!(doc.permissions.len(), 1);
    }

    #[test]
    fn property_definition_requires_key() {
        let err = PropertyDefinitionDocument::decode("partition: p1\ntype: t\n").unwrap_err();
        assert_eq!(err, MetadataError::InvalidInput("key is required".into()));
    }
}
