use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("unknown object type scope: {0}")]
    UnknownScope(String),
}
