use runm_types::{PropertySchema, SchemaType};

use crate::check::{CheckOutcome, ValueCheck};
use crate::error::SchemaError;

/// Checks that the value parses as one of the schema's allowed types.
pub struct TypeCheck;

/// Returns `true` if `value` is a valid literal of type `t`.
pub fn value_is(value: &str, t: SchemaType) -> bool {
    match t {
        SchemaType::String => true,
        SchemaType::Integer => value.parse::<i64>().is_ok(),
        SchemaType::Number => value.parse::<f64>().map(f64::is_finite).unwrap_or(false),
        SchemaType::Boolean => matches!(value, "true" | "false"),
    }
}

impl ValueCheck for TypeCheck {
    fn name(&self) -> &str {
        "type"
    }

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError> {
        if schema.types.is_empty() || schema.types.iter().any(|t| value_is(value, *t)) {
            return Ok(CheckOutcome::Pass);
        }
        let allowed: Vec<&str> = schema.types.iter().map(SchemaType::as_str).collect();
        Ok(CheckOutcome::fail(format!(
            "value '{value}' is not of type {}",
            allowed.join(" or ")
        )))
    }
}
