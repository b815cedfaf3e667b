//! Inference Engine Implementation

use crate::model::{ModelArtifact, Regressor};
use crate::onnx::OnnxRegressor;
use crate::InferenceError;
use std::time::Instant;
use tracing::{debug, info};

/// Result of inference operation
#[derive(Debug, Clone, Copy)]
pub struct InferenceResult {
    /// Raw model output
    pub value: f64,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Owns the loaded regression model for the lifetime of the process
pub struct InferenceEngine {
    model: Box<dyn Regressor>,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("kind", &self.model.kind())
            .field("num_features", &self.model.num_features())
            .finish()
    }
}

impl InferenceEngine {
    /// Load a model artifact, checking it against the expected feature count
    pub fn load(artifact: ModelArtifact, expected_features: usize) -> Result<Self, InferenceError> {
        let model: Box<dyn Regressor> = match artifact {
            ModelArtifact::Linear(m) => Box::new(m),
            ModelArtifact::Forest(m) => Box::new(m),
            ModelArtifact::Onnx { path, num_features } => {
                Box::new(OnnxRegressor::load(&path, num_features)?)
            }
        };
        Self::from_regressor(model, expected_features)
    }

    /// Wrap an already-built regressor
    pub fn from_regressor(
        model: Box<dyn Regressor>,
        expected_features: usize,
    ) -> Result<Self, InferenceError> {
        if model.num_features() != expected_features {
            return Err(InferenceError::ModelUnavailable(format!(
                "{} model expects {} features, schema has {}",
                model.kind(),
                model.num_features(),
                expected_features
            )));
        }

        info!(
            "Inference engine ready: {} model over {} features",
            model.kind(),
            model.num_features()
        );
        Ok(Self { model })
    }

    /// Run inference on an encoded, scaled feature vector
    pub fn predict(&self, features: &[f64]) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        if features.len() != self.model.num_features() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.model.num_features().to_string(),
                actual: features.len().to_string(),
            });
        }

        let value = self.model.predict(features)?;
        if !value.is_finite() {
            return Err(InferenceError::InferenceFailed(format!(
                "model returned non-finite value {}",
                value
            )));
        }

        let latency_us = start.elapsed().as_micros() as u64;
        debug!("Inference completed in {}us", latency_us);

        Ok(InferenceResult { value, latency_us })
    }

    pub fn num_features(&self) -> usize {
        self.model.num_features()
    }

    /// Model family name
    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }
}
