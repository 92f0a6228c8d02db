use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Scope within which object names of a given type must be unique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectTypeScope {
    /// Names are unique within a partition.
    #[default]
    Partition,
    /// Names are unique within a partition and project.
    Project,
}

impl ObjectTypeScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partition => "partition",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ObjectTypeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectTypeScope {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "partition" => Ok(Self::Partition),
            "project" => Ok(Self::Project),
            _ => Err(TypeError::UnknownScope(s.to_string())),
        }
    }
}

/// A classification code (e.g. `runm.provider`) governing the name
/// uniqueness scope of objects of that type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectType {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scope: ObjectTypeScope,
}

impl ObjectType {
    pub fn new(code: impl Into<String>, scope: ObjectTypeScope) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            scope,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns `true` if object names are unique per project.
    pub fn is_project_scoped(&self) -> bool {
        self.scope == ObjectTypeScope::Project
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_case_insensitively() {
        assert_eq!("PROJECT".parse::<ObjectTypeScope>().unwrap(), ObjectTypeScope::Project);
        assert_eq!("partition".parse::<ObjectTypeScope>().unwrap(), ObjectTypeScope::Partition);
        assert!(matches!(
            "tenant".parse::<ObjectTypeScope>(),
            Err(TypeError::UnknownScope(_))
        ));
    }

    #[test]
    fn default_scope_is_partition() {
        let t: ObjectType = serde_json::from_str(r#"{"code":"runm.provider"}"#).unwrap();
        assert_eq!(t.scope, ObjectTypeScope::Partition);
        assert!(!t.is_project_scoped());
    }

    #[test]
    fn project_scope_serializes_lowercase() {
        let t = ObjectType::new("runm.image", ObjectTypeScope::Project).with_description("images");
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains(r#""scope":"project""#));
        assert!(t.is_project_scoped());
    }
}
