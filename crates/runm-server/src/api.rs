//! JSON request and response bodies. Every request carries the caller's
//! session.

use serde::{Deserialize, Serialize};

use runm_types::{Object, PropertyDefinitionWithReferences, Session};

/// A set request: `payload` is a YAML (or JSON) document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub session: Session,
    pub payload: String,
}

/// A get request with exactly one filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest<F> {
    #[serde(default)]
    pub session: Session,
    pub filter: F,
}

/// A list or delete request; filters are ORed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyRequest<F> {
    #[serde(default)]
    pub session: Session,
    #[serde(default = "Vec::new")]
    pub any: Vec<F>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSetResponse {
    pub object: Object,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinitionSetResponse {
    pub property_definition: PropertyDefinitionWithReferences,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
