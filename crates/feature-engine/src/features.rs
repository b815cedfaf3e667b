//! Feature Vector Assembly

use crate::encoder::CategoricalEncoder;
use crate::error::FeatureError;
use crate::record::PredictionRequest;
use crate::schema::{FeatureSchema, FieldKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered, encoded (not yet scaled) feature values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// One value per schema field, in schema order
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Assembles raw records into the column order the model was trained on
pub struct FeatureAssembler<'a> {
    schema: &'a FeatureSchema,
    encoder: &'a CategoricalEncoder,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(schema: &'a FeatureSchema, encoder: &'a CategoricalEncoder) -> Self {
        Self { schema, encoder }
    }

    /// Encode categoricals, pass numerics through, and lay values out by
    /// schema position.
    ///
    /// Expects a validated record; a missing or mistyped value here is
    /// reported as an error rather than defaulted.
    pub fn assemble(&self, request: &PredictionRequest) -> Result<FeatureVector, FeatureError> {
        let mut values = Vec::with_capacity(self.schema.len());

        for field in self.schema.describe() {
            let raw = request
                .get(&field.name)
                .ok_or_else(|| FeatureError::MissingValue(field.name.clone()))?;

            let value = match field.kind {
                FieldKind::Categorical => {
                    let text = raw.as_text().ok_or_else(|| FeatureError::TypeMismatch {
                        field: field.name.clone(),
                        expected: "text",
                        actual: raw.type_name(),
                    })?;
                    self.encoder.encode(&field.name, text)? as f64
                }
                FieldKind::Numeric => raw.as_number().ok_or_else(|| FeatureError::TypeMismatch {
                    field: field.name.clone(),
                    expected: "number",
                    actual: raw.type_name(),
                })?,
            };
            values.push(value);
        }

        debug!("Assembled {} features", values.len());
        Ok(FeatureVector { values })
    }
}
