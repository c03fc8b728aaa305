//! Error types for Ladle core validation.

use thiserror::Error;

/// Validation errors for caller-supplied domain input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("ingredient quantity must be non-negative, got {0}")]
    NegativeQuantity(f64),

    #[error("step timer must be non-negative, got {0}")]
    NegativeTimer(i64),

    #[error("page size must be at least 1")]
    InvalidPageSize,
}
