//! Declarative (human-authored) schema documents and their translation into
//! the storage representation.
//!
//! Type and format names are symbolic strings in a document. Unknown symbols
//! are logged and dropped rather than rejected, so documents written against
//! a newer schema vocabulary still load.

use serde::{Deserialize, Serialize};

use runm_types::{Permission, PropertyPermission, PropertySchema, SchemaFormat, SchemaType};

use crate::checks::pattern;
use crate::error::{SchemaError, SchemaResult};

/// A property schema as written in a YAML/JSON document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, rename = "type", alias = "types")]
    pub types: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub minimum: Option<i64>,
    #[serde(default)]
    pub maximum: Option<i64>,
    #[serde(default)]
    pub multiple_of: Option<u64>,
    #[serde(default)]
    pub min_length: Option<u64>,
    #[serde(default)]
    pub max_length: Option<u64>,
}

/// A permission grant as written in a document: `permission` is one of
/// `r`, `w` or `rw`; anything else grants nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDocument {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub permission: String,
}

/// The result of translating a document: the storage schema plus the
/// symbols that were dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Translated {
    pub schema: PropertySchema,
    pub warnings: Vec<String>,
}

pub fn parse_type(symbol: &str) -> Option<SchemaType> {
    match symbol {
        "string" => Some(SchemaType::String),
        "integer" => Some(SchemaType::Integer),
        "number" => Some(SchemaType::Number),
        "boolean" => Some(SchemaType::Boolean),
        _ => None,
    }
}

pub fn parse_format(symbol: &str) -> Option<SchemaFormat> {
    let format = match symbol {
        "date-time" => SchemaFormat::DateTime,
        "date" => SchemaFormat::Date,
        "time" => SchemaFormat::Time,
        "email" => SchemaFormat::Email,
        "idn-email" => SchemaFormat::IdnEmail,
        "hostname" => SchemaFormat::Hostname,
        "idn-hostname" => SchemaFormat::IdnHostname,
        "ipv4" => SchemaFormat::Ipv4,
        "ipv6" => SchemaFormat::Ipv6,
        "uri" => SchemaFormat::Uri,
        "uri-reference" => SchemaFormat::UriReference,
        "iri" => SchemaFormat::Iri,
        "iri-reference" => SchemaFormat::IriReference,
        "uri-template" => SchemaFormat::UriTemplate,
        _ => return None,
    };
    Some(format)
}

impl SchemaDocument {
    /// Translates this document into a [`PropertySchema`].
    ///
    /// Fails only on an uncompilable `pattern` or inverted bounds.
    pub fn translate(&self) -> SchemaResult<Translated> {
        let mut warnings = Vec::new();

        let mut types = Vec::with_capacity(self.types.len());
        for symbol in &self.types {
            match parse_type(symbol) {
                Some(t) if !types.contains(&t) => types.push(t),
                Some(_) => {}
                None => {
                    tracing::warn!(symbol = %symbol, "unexpected property schema type; ignoring");
                    warnings.push(format!("unknown type '{symbol}'"));
                }
            }
        }

        let format = match self.format.as_deref().filter(|f| !f.is_empty()) {
            None => None,
            Some(symbol) => {
                let parsed = parse_format(symbol);
                if parsed.is_none() {
                    tracing::warn!(symbol = %symbol, "unexpected property schema format; ignoring");
                    warnings.push(format!("unknown format '{symbol}'"));
                }
                parsed
            }
        };

        let pattern = match self.pattern.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => {
                pattern::compile(p)?;
                Some(p.to_string())
            }
            None => None,
        };

        if let (Some(min), Some(max)) = (self.minimum, self.maximum) {
            if min > max {
                return Err(SchemaError::InvalidBounds(format!(
                    "minimum {min} is greater than maximum {max}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_length, self.max_length) {
            if min > max {
                return Err(SchemaError::InvalidBounds(format!(
                    "min_length {min} is greater than max_length {max}"
                )));
            }
        }

        Ok(Translated {
            schema: PropertySchema {
                types,
                format,
                pattern,
                minimum: self.minimum,
                maximum: self.maximum,
                multiple_of: self.multiple_of,
                min_length: self.min_length,
                max_length: self.max_length,
            },
            warnings,
        })
    }
}

impl PermissionDocument {
    pub fn translate(&self) -> PropertyPermission {
        let permission = match self.permission.as_str() {
            "r" => Permission::READ,
            "w" => Permission::WRITE,
            "rw" => Permission::READ_WRITE,
            _ => Permission::NONE,
        };
        PropertyPermission {
            project: self.project.clone().filter(|p| !p.is_empty()),
            role: self.role.clone().filter(|r| !r.is_empty()),
            permission,
        }
    }
}

/// Translates a list of permission documents, preserving order.
pub fn translate_permissions(docs: &[PermissionDocument]) -> Vec<PropertyPermission> {
    docs.iter().map(PermissionDocument::translate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_known_symbols() {
        let doc: SchemaDocument = serde_yaml::from_str(
            r#"
type: [string, integer]
format: hostname
pattern: "^[a-z]"
min_length: 1
max_length: 63
"#,
        )
        .unwrap();
        let t = doc.translate().unwrap();
        assert_eq!(t.schema.types, vec![SchemaType::String, SchemaType::Integer]);
        assert_eq!(t.schema.format, Some(SchemaFormat::Hostname));
        assert_eq!(t.schema.pattern.as_deref(), Some("^[a-z]"));
        assert_eq!(t.schema.max_length, Some(63));
        assert!(t.warnings.is_empty());
    }

    #[test]
    fn unknown_symbols_are_dropped_with_warnings() {
        let doc = SchemaDocument {
            types: vec!["string".into(), "decimal".into(), "string".into()],
            format: Some("color".into()),
            ..Default::default()
        };
        let t = doc.translate().unwrap();
        assert_eq!(t.schema.types, vec![SchemaType::String]);
        assert_eq!(t.schema.format, None);
        assert_eq!(t.warnings.len(), 2);
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let doc = SchemaDocument {
            pattern: Some("[".into()),
            ..Default::default()
        };
        assert!(matches!(
            doc.translate(),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let doc = SchemaDocument {
            minimum: Some(10),
            maximum: Some(1),
            ..Default::default()
        };
        assert!(matches!(doc.translate(), Err(SchemaError::InvalidBounds(_))));
    }

    #[test]
    fn types_alias_is_accepted() {
        let doc: SchemaDocument = serde_yaml::from_str("types: [boolean]").unwrap();
        assert_eq!(doc.translate().unwrap().schema.types, vec![SchemaType::Boolean]);
    }

    #[test]
    fn permissions_translate() {
        let docs: Vec<PermissionDocument> = serde_yaml::from_str(
            r#"
- project: acme
  permission: rw
- role: admin
  permission: r
- permission: x
"#,
        )
        .unwrap();
        let perms = translate_permissions(&docs);
        assert_eq!(perms[0].permission, Permission::READ_WRITE);
        assert_eq!(perms[0].project.as_deref(), Some("acme"));
        assert_eq!(perms[1].permission, Permission::READ);
        assert_eq!(perms[1].role.as_deref(), Some("admin"));
        assert_eq!(perms[2].permission, Permission::NONE);
    }
}
