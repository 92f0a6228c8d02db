use std::time::{Duration, Instant};

use runm_types::PropertySchema;

use crate::check::{CheckOutcome, CheckResult, ValueCheck};
use crate::checks::{FormatCheck, LengthCheck, NumericCheck, PatternCheck, TypeCheck};
use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// The outcome of running one property value through the full pipeline.
#[derive(Clone, Debug)]
pub struct ValidationResult {
    /// Property key the value was submitted under.
    pub key: String,
    /// `None` when every check passed.
    pub failure: Option<String>,
    /// Per-check results in evaluation order.
    pub check_results: Vec<CheckResult>,
    pub elapsed: Duration,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

// ---------------------------------------------------------------------------
// SchemaValidator
// ---------------------------------------------------------------------------

/// An ordered pipeline of [`ValueCheck`]s applied to a property value.
pub struct SchemaValidator {
    checks: Vec<Box<dyn ValueCheck>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

impl SchemaValidator {
    /// An empty pipeline; accepts every value.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// The standard pipeline:
    /// type -> numeric -> length -> format -> pattern
    pub fn with_default_checks() -> Self {
        let mut validator = Self::new();
        validator.add_check(Box::new(TypeCheck));
        validator.add_check(Box::new(NumericCheck));
        validator.add_check(Box::new(LengthCheck));
        validator.add_check(Box::new(FormatCheck));
        validator.add_check(Box::new(PatternCheck));
        validator
    }

    pub fn add_check(&mut self, check: Box<dyn ValueCheck>) {
        self.checks.push(check);
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Validate `value` against `schema`.
    ///
    /// The pipeline is **fail-fast**: the first failing check stops
    /// evaluation and its reason becomes the result's failure.
    pub fn validate(
        &self,
        key: &str,
        value: &str,
        schema: &PropertySchema,
    ) -> Result<ValidationResult, SchemaError> {
        let pipeline_start = Instant::now();
        let mut check_results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let check_start = Instant::now();
            let outcome = check.check(value, schema)?;
            let elapsed = check_start.elapsed();

            let reason = match &outcome {
                CheckOutcome::Pass => None,
                CheckOutcome::Fail { reason } => Some(reason.clone()),
            };
            check_results.push(CheckResult {
                check_name: check.name().to_string(),
                passed: reason.is_none(),
                reason: reason.clone(),
                elapsed,
            });

            if let Some(reason) = reason {
                tracing::debug!(key, check = check.name(), %reason, "property value rejected");
                return Ok(ValidationResult {
                    key: key.to_string(),
                    failure: Some(reason),
                    check_results,
                    elapsed: pipeline_start.elapsed(),
                });
            }
        }

        Ok(ValidationResult {
            key: key.to_string(),
            failure: None,
            check_results,
            elapsed: pipeline_start.elapsed(),
        })
    }
}
