//! Price Inference Engine
//!
//! Loads a fitted regression model once and runs it on encoded, scaled
//! feature vectors. Linear and random-forest models are evaluated natively;
//! ONNX graphs run through tract.

mod engine;
mod model;
mod onnx;

pub use engine::{InferenceEngine, InferenceResult};
pub use model::{
    ForestRegressor, LinearRegressor, ModelArtifact, RegressionTree, Regressor, TreeNode,
};
pub use onnx::OnnxRegressor;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
}
