//! Property schema translation and value validation.
//!
//! Property values are plain strings. When a property definition binds a
//! schema to a (partition, object type, key) triple, every value submitted
//! under that key runs through a [`SchemaValidator`]: an ordered, fail-fast
//! pipeline of [`ValueCheck`]s (type, numeric bounds, length, format,
//! pattern).
//!
//! # Quick Start
//!
//! ```rust
//! use runm_schema::{SchemaDocument, SchemaValidator};
//!
//! let doc = SchemaDocument {
//!     types: vec!["integer".into()],
//!     minimum: Some(1),
//!     ..Default::default()
//! };
//! let schema = doc.translate().unwrap().schema;
//! let validator = SchemaValidator::with_default_checks();
//! assert!(validator.validate("cores", "8", &schema).unwrap().is_valid());
//! assert!(!validator.validate("cores", "0", &schema).unwrap().is_valid());
//! ```

pub mod check;
pub mod checks;
pub mod document;
pub mod error;
pub mod validator;

pub use check::{CheckOutcome, CheckResult, ValueCheck};
pub use checks::{FormatCheck, LengthCheck, NumericCheck, PatternCheck, TypeCheck};
pub use document::{translate_permissions, PermissionDocument, SchemaDocument, Translated};
pub use error::{SchemaError, SchemaResult};
pub use validator::{SchemaValidator, ValidationResult};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use runm_types::{PropertySchema, SchemaType};

    fn integer_range(min: i64, max: i64) -> PropertySchema {
        PropertySchema {
            types: vec![SchemaType::Integer],
            minimum: Some(min),
            maximum: Some(max),
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn integers_inside_range_are_valid(min in -1000i64..1000, span in 0i64..1000, offset in 0i64..1000) {
            let max = min + span;
            let value = min + offset.min(span);
            let v = SchemaValidator::with_default_checks();
            let result = v.validate("n", &value.to_string(), &integer_range(min, max)).unwrap();
            prop_assert!(result.is_valid());
        }

        #[test]
        fn integers_above_range_are_rejected(min in -1000i64..1000, span in 0i64..1000, over in 1i64..1000) {
            let max = min + span;
            let v = SchemaValidator::with_default_checks();
            let result = v.validate("n", &(max + over).to_string(), &integer_range(min, max)).unwrap();
            prop_assert!(!result.is_valid());
            prop_assert_eq!(result.check_results.last().unwrap().check_name.as_str(), "numeric");
        }

        #[test]
        fn length_bound_matches_char_count(s in "\\PC{0,20}", max in 0u64..20) {
            let schema = PropertySchema { max_length: Some(max), ..Default::default() };
            let v = SchemaValidator::with_default_checks();
            let valid = v.validate("s", &s, &schema).unwrap().is_valid();
            prop_assert_eq!(valid, s.chars().count() as u64 <= max);
        }
    }
}
