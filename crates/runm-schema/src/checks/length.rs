use runm_types::{PropertySchema, SchemaType};

use crate::check::{CheckOutcome, ValueCheck};
use crate::error::SchemaError;

/// Enforces `min_length` / `max_length` in characters, for schemas that
/// allow strings.
pub struct LengthCheck;

impl ValueCheck for LengthCheck {
    fn name(&self) -> &str {
        "length"
    }

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError> {
        if !schema.allows(SchemaType::String) {
            return Ok(CheckOutcome::Pass);
        }
        let len = value.chars().count() as u64;
        if let Some(min) = schema.min_length {
            if len < min {
                return Ok(CheckOutcome::fail(format!(
                    "length {len} is shorter than minimum length {min}"
                )));
            }
        }
        if let Some(max) = schema.max_length {
            if len > max {
                return Ok(CheckOutcome::fail(format!(
                    "length {len} exceeds maximum length; must be at most {max}"
                )));
            }
        }
        Ok(CheckOutcome::Pass)
    }
}
