use std::time::Duration;

use runm_types::PropertySchema;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// CheckOutcome
// ---------------------------------------------------------------------------

/// The outcome of evaluating one value check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The value satisfies this check (or the check does not apply).
    Pass,
    /// The value violates the schema.
    Fail { reason: String },
}

impl CheckOutcome {
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail {
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

// ---------------------------------------------------------------------------
// CheckResult
// ---------------------------------------------------------------------------

/// Recorded result from a completed check.
#[derive(Clone, Debug)]
pub struct CheckResult {
    pub check_name: String,
    pub passed: bool,
    /// Populated on failure.
    pub reason: Option<String>,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// ValueCheck trait
// ---------------------------------------------------------------------------

/// A single check in the validation pipeline.
///
/// Checks are evaluated in order against the raw string value of a property
/// and the schema bound to its key. A check that does not apply to the
/// schema (no bound set, type not allowed) returns [`CheckOutcome::Pass`].
pub trait ValueCheck: Send + Sync {
    /// Short name used in results and logs (e.g. "type", "length").
    fn name(&self) -> &str;

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError>;
}
