//! Validation Error Types

use serde::Serialize;
use thiserror::Error;

/// User-correctable problems with a prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite numeric value
    #[error("{field} value is not a finite number")]
    NotFinite { field: String },

    /// Categorical value outside the offered choices
    #[error("{field} has unknown category {value:?}")]
    UnknownCategory { field: String, value: String },

    /// Categorical value not offered together with another field's value
    #[error("{field} {value:?} is not offered with {depends_on} {parent_value:?}")]
    NotOfferedWith {
        field: String,
        value: String,
        depends_on: String,
        parent_value: String,
    },

    /// Wrong value type for the field
    #[error("{field} expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Field not declared in the schema
    #[error("Unexpected field: {field}")]
    UnexpectedField { field: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::NotFinite { field }
            | ValidationError::UnknownCategory { field, .. }
            | ValidationError::NotOfferedWith { field, .. }
            | ValidationError::TypeMismatch { field, .. }
            | ValidationError::MissingField { field }
            | ValidationError::UnexpectedField { field } => field,
        }
    }
}
