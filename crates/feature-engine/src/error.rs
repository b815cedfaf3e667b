//! Feature Engineering Error Types

use thiserror::Error;

/// Errors raised while building or applying fitted feature artifacts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Field is not declared in the schema or encoder
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Value was never seen when the encoder was fitted
    #[error("Unknown category {value:?} for field {field}")]
    UnknownCategory { field: String, value: String },

    /// Record lacks a value for a schema field
    #[error("Missing value for field {0}")]
    MissingValue(String),

    /// Value has the wrong type for its field
    #[error("Field {field} expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Vector length disagrees with the fitted parameters
    #[error("Schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// Schema declaration is malformed
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Vocabulary cannot form a bijection
    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    /// Scaler parameters are unusable
    #[error("Invalid scaler parameters: {0}")]
    InvalidScaler(String),
}
