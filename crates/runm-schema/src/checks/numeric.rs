use runm_types::PropertySchema;

use crate::check::{CheckOutcome, ValueCheck};
use crate::error::SchemaError;

/// Enforces `minimum`, `maximum` (inclusive) and `multiple_of` on values
/// that parse as numbers.
///
/// Values that are not numeric are left to the type check; a schema that
/// does not allow integer or number skips this check entirely.
pub struct NumericCheck;

impl ValueCheck for NumericCheck {
    fn name(&self) -> &str {
        "numeric"
    }

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError> {
        if !schema.is_numeric() {
            return Ok(CheckOutcome::Pass);
        }
        let n = match value.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => return Ok(CheckOutcome::Pass),
        };
        // Integers compare exactly; f64 loses precision past 2^53.
        let int = value.parse::<i64>().ok();

        if let Some(min) = schema.minimum {
            let below = match int {
                Some(i) => i < min,
                None => n < min as f64,
            };
            if below {
                return Ok(CheckOutcome::fail(format!(
                    "value {value} is less than minimum {min}"
                )));
            }
        }
        if let Some(max) = schema.maximum {
            let above = match int {
                Some(i) => i > max,
                None => n > max as f64,
            };
            if above {
                return Ok(CheckOutcome::fail(format!(
                    "value {value} is greater than maximum {max}"
                )));
            }
        }
        if let Some(m) = schema.multiple_of.filter(|m| *m != 0) {
            let is_multiple = match int {
                Some(i) => i.unsigned_abs() % m == 0,
                None => (n / m as f64).fract() == 0.0,
            };
            if !is_multiple {
                return Ok(CheckOutcome::fail(format!(
                    "value {value} is not a multiple of {m}"
                )));
            }
        }
        Ok(CheckOutcome::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runm_types::SchemaType;

    fn bounded(min: Option<i64>, max: Option<i64>, multiple_of: Option<u64>) -> PropertySchema {
        PropertySchema {
            types: vec![SchemaType::Integer],
            minimum: min,
            maximum: max,
            multiple_of,
            ..Default::default()
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let s = bounded(Some(1), Some(64), None);
        assert!(NumericCheck.check("1", &s).unwrap().is_pass());
        assert!(NumericCheck.check("64", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("0", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("65", &s).unwrap().is_pass());
    }

    #[test]
    fn large_integers_compare_exactly() {
        let s = bounded(Some(-9_007_199_254_740_992), Some(9_007_199_254_740_992), None);
        assert!(NumericCheck.check("9007199254740992", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("9007199254740993", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("-9007199254740993", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("9223372036854775807", &s).unwrap().is_pass());
    }

    #[test]
    fn multiple_of() {
        let s = bounded(None, None, Some(4));
        assert!(NumericCheck.check("16", &s).unwrap().is_pass());
        assert!(NumericCheck.check("-8", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("10", &s).unwrap().is_pass());
        assert!(NumericCheck.check("8.0", &s).unwrap().is_pass());
        assert!(!NumericCheck.check("8.5", &s).unwrap().is_pass());
    }

    #[test]
    fn zero_multiple_is_ignored() {
        let s = bounded(None, None, Some(0));
        assert!(NumericCheck.check("7", &s).unwrap().is_pass());
    }

    #[test]
    fn non_numeric_values_are_skipped() {
        let s = bounded(Some(10), None, None);
        assert!(NumericCheck.check("abc", &s).unwrap().is_pass());
    }

    #[test]
    fn string_only_schema_skips_bounds() {
        let s = PropertySchema {
            types: vec![SchemaType::String],
            minimum: Some(10),
            ..Default::default()
        };
        assert!(NumericCheck.check("3", &s).unwrap().is_pass());
    }
}
