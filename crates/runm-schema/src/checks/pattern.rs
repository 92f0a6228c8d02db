use regex::Regex;
use runm_types::PropertySchema;

use crate::check::{CheckOutcome, ValueCheck};
use crate::error::SchemaError;

/// Unanchored regex search against the schema's `pattern`.
pub struct PatternCheck;

/// Compiles a schema pattern, mapping regex errors to [`SchemaError`].
pub fn compile(pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl ValueCheck for PatternCheck {
    fn name(&self) -> &str {
        "pattern"
    }

    fn check(&self, value: &str, schema: &PropertySchema) -> Result<CheckOutcome, SchemaError> {
        let Some(pattern) = schema.pattern.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(CheckOutcome::Pass);
        };
        let re = compile(pattern)?;
        if re.is_match(value) {
            Ok(CheckOutcome::Pass)
        } else {
            Ok(CheckOutcome::fail(format!(
                "value '{value}' does not match pattern '{pattern}'"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_pattern(p: &str) -> PropertySchema {
        PropertySchema {
            pattern: Some(p.into()),
            ..Default::default()
        }
    }

    #[test]
    fn search_is_unanchored() {
        let s = with_pattern("86");
        assert!(PatternCheck.check("x86_64", &s).unwrap().is_pass());
        assert!(!PatternCheck.check("arm64", &s).unwrap().is_pass());
    }

    #[test]
    fn anchors_are_honored() {
        let s = with_pattern("^x86");
        assert!(!PatternCheck.check("amd-x86", &s).unwrap().is_pass());
    }

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(PatternCheck.check("anything", &with_pattern("")).unwrap().is_pass());
    }

    #[test]
    fn bad_pattern_is_an_error() {
        let err = PatternCheck.check("a", &with_pattern("(unclosed")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }
}
