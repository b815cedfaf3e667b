//! ONNX Regressor backed by tract

use crate::model::Regressor;
use crate::InferenceError;
use std::path::{Path, PathBuf};
use tracing::info;
use tract_onnx::prelude::*;

/// Regression graph exported to ONNX, run with tract
pub struct OnnxRegressor {
    plan: TypedRunnableModel<TypedModel>,
    num_features: usize,
    path: PathBuf,
}

impl OnnxRegressor {
    /// Load and optimize an ONNX graph with a fixed `[1, num_features]` input.
    ///
    /// A graph whose input cannot take that shape fails here, never at
    /// predict time.
    pub fn load(path: &Path, num_features: usize) -> Result<Self, InferenceError> {
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, num_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                InferenceError::ModelUnavailable(format!("{}: {}", path.display(), e))
            })?;

        Ok(Self {
            plan,
            num_features,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Regressor for OnnxRegressor {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let values: Vec<f32> = features.iter().map(|&v| v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.num_features), values)
            .map_err(|e| InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.num_features),
                actual: e.to_string(),
            })?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        view.iter()
            .next()
            .map(|&v| v as f64)
            .ok_or_else(|| InferenceError::InferenceFailed("model output is empty".to_string()))
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
