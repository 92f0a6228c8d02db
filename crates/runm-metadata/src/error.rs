//! Errors returned across the service boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use runm_schema::SchemaError;
use runm_store::StoreError;

/// Outcome of a best-effort batch delete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// One human-readable message per failed item, in processing order.
    pub errors: Vec<String>,
    /// Number of items actually deleted.
    pub num_deleted: u64,
}

impl DeleteResponse {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Errors returned across the metadata service boundary.
///
/// Every variant is safe to show to a caller. Storage failures are mapped
/// through [`MetadataError::from_store`], which logs the cause and hides it
/// behind [`MetadataError::Internal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed for property '{key}': {reason}")]
    ValidationFailed { key: String, reason: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("an unknown error occurred")]
    Internal,

    #[error("failed to delete {} object(s)", .0.errors.len())]
    DeleteFailed(DeleteResponse),

    #[error("failed to delete {} property definition(s)", .0.errors.len())]
    PropertyDefinitionDeleteFailed(DeleteResponse),
}

impl MetadataError {
    /// Maps a storage error to its caller-safe counterpart.
    ///
    /// `context` describes the operation and only reaches the log.
    pub fn from_store(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, key } => Self::NotFound(format!("{kind} '{key}'")),
            StoreError::AlreadyExists { kind, key } => {
                Self::Conflict(format!("{kind} '{key}' already exists"))
            }
            StoreError::Conflict { kind, key } => {
                Self::Conflict(format!("{kind} '{key}' was modified concurrently"))
            }
            StoreError::DeadlineExceeded => {
                tracing::warn!(context, "deadline exceeded");
                Self::DeadlineExceeded
            }
            other => {
                tracing::error!(context, error = %other, "storage failure");
                Self::Internal
            }
        }
    }

    /// Short machine-readable kind, used in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::PreconditionFailed(_) => "precondition_failed",
            Self::NotFound(_) => "not_found",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::Conflict(_) => "conflict",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Internal => "internal",
            Self::DeleteFailed(_) | Self::PropertyDefinitionDeleteFailed(_) => "delete_failed",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<SchemaError> for MetadataError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::InvalidPattern { .. } | SchemaError::InvalidBounds(_) => {
                Self::InvalidInput(e.to_string())
            }
            SchemaError::CheckError { .. } => {
                tracing::error!(error = %e, "schema check failed");
                Self::Internal
            }
        }
    }
}

pub type MetadataResult<T> = Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_are_sanitized() {
        let err = MetadataError::from_store(
            "listing objects",
            StoreError::Backend("etcd: connection refused at 10.0.0.4:2379".into()),
        );
        assert_eq!(err, MetadataError::Internal);
        assert!(!err.to_string().contains("etcd"));
    }

    #[test]
    fn store_kinds_map_to_service_kinds() {
        let nf = MetadataError::from_store("x", StoreError::not_found("partition", "p1"));
        assert!(nf.is_not_found());
        let lost = MetadataError::from_store(
            "x",
            StoreError::AlreadyExists {
                kind: "object",
                key: "web".into(),
            },
        );
        assert_eq!(lost.kind(), "conflict");
        assert_eq!(
            MetadataError::from_store("x", StoreError::DeadlineExceeded),
            MetadataError::DeadlineExceeded
        );
        assert_eq!(
            MetadataError::from_store("x", StoreError::Serialization("bad json".into())),
            MetadataError::Internal
        );
    }

    #[test]
    fn bad_pattern_is_invalid_input() {
        let err: MetadataError = SchemaError::InvalidPattern {
            pattern: "[".into(),
            reason: "unclosed".into(),
        }
        .into();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn delete_failed_reports_count() {
        let err = MetadataError::DeleteFailed(DeleteResponse {
            errors: vec!["failed to delete object x".into()],
            num_deleted: 2,
        });
        assert_eq!(err.to_string(), "failed to delete 1 object(s)");
    }
}
