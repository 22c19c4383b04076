use thiserror::Error;

/// Validation and contract errors exposed by `windward-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exchange code cannot be empty")]
    EmptyCode,
    #[error("exchange code length {len} outside {min}..={max}")]
    CodeLength { len: usize, min: usize, max: usize },
    #[error("exchange code contains non-digit '{ch}' at index {index}")]
    CodeInvalidChar { ch: char, index: usize },

    #[error("invalid date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid provider '{value}', expected one of yahoo, twse")]
    InvalidProvider { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
