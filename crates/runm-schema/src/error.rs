/// Errors raised while translating or evaluating property schemas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The schema's `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// `minimum` is greater than `maximum`, or `min_length` than `max_length`.
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    /// A check failed for reasons unrelated to the value itself.
    #[error("check error in '{check}': {message}")]
    CheckError { check: String, message: String },
}

impl SchemaError {
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckError {
            check: check.into(),
            message: message.into(),
        }
    }
}

pub type SchemaResult<T> = Result<T, SchemaError>;
