//! Request Validator

use crate::error::ValidationError;
use feature_engine::{FeatureSchema, FieldKind, FieldSpec, FieldValue, PredictionRequest};
use std::sync::Arc;
use tracing::debug;

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Convert into a `Result`, keeping every error
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validates raw requests against the feature schema
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Arc<FeatureSchema>,
}

impl Validator {
    /// Create a new validator over a schema
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Check every field of a request, collecting all problems
    pub fn validate(&self, request: &PredictionRequest) -> ValidationResult {
        let mut errors = Vec::new();

        for field in self.schema.describe() {
            match request.get(&field.name) {
                Some(value) => {
                    let checked = self
                        .validate_field(field, value)
                        .and_then(|()| self.validate_dependency(field, value, request));
                    if let Err(e) = checked {
                        errors.push(e);
                    }
                }
                None => errors.push(ValidationError::MissingField {
                    field: field.name.clone(),
                }),
            }
        }

        for (name, _) in request.fields() {
            if self.schema.field(name).is_none() {
                errors.push(ValidationError::UnexpectedField {
                    field: name.to_string(),
                });
            }
        }

        let fields_checked = self.schema.len();
        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Request failed validation with {} errors", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }

    /// Validate one value against its declaration
    pub fn validate_field(&self, field: &FieldSpec, value: &FieldValue) -> Result<(), ValidationError> {
        match (field.kind, value) {
            (FieldKind::Categorical, FieldValue::Text(text)) => self.validate_category(field, text),
            (FieldKind::Numeric, FieldValue::Number(number)) => {
                if !number.is_finite() {
                    return Err(ValidationError::NotFinite {
                        field: field.name.clone(),
                    });
                }
                match field.numeric_range {
                    Some(range) => self.validate_range(&field.name, *number, range),
                    None => Ok(()),
                }
            }
            (FieldKind::Categorical, other) => Err(ValidationError::TypeMismatch {
                field: field.name.clone(),
                expected: "text",
                actual: other.type_name(),
            }),
            (FieldKind::Numeric, other) => Err(ValidationError::TypeMismatch {
                field: field.name.clone(),
                expected: "number",
                actual: other.type_name(),
            }),
        }
    }

    /// Check a categorical value against the choice made for the field it
    /// depends on. A controlling value that is itself invalid is reported on
    /// its own field, so it restricts nothing here.
    pub fn validate_dependency(
        &self,
        field: &FieldSpec,
        value: &FieldValue,
        request: &PredictionRequest,
    ) -> Result<(), ValidationError> {
        let (Some(dep), Some(text)) = (&field.depends_on, value.as_text()) else {
            return Ok(());
        };
        let Some(parent_value) = request.get(&dep.field).and_then(FieldValue::as_text) else {
            return Ok(());
        };

        if dep.offers(parent_value, text) {
            Ok(())
        } else {
            Err(ValidationError::NotOfferedWith {
                field: field.name.clone(),
                value: text.to_string(),
                depends_on: dep.field.clone(),
                parent_value: parent_value.to_string(),
            })
        }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a categorical value against the schema's allowed values
    pub fn validate_category(&self, field: &FieldSpec, value: &str) -> Result<(), ValidationError> {
        if field.allows(value) {
            Ok(())
        } else {
            Err(ValidationError::UnknownCategory {
                field: field.name.clone(),
                value: value.to_string(),
            })
        }
    }
}
