//! Pipeline Error Types

use crate::result::{PredictionResult, Stage};
use artifact_store::ArtifactError;
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use thiserror::Error;
use uuid::Uuid;

/// Hard failures: the deployment is broken, not the request
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Artifacts failed to load or disagree with each other
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Components disagree on layout or vocabulary at request time
    #[error("Schema mismatch after {stage} stage: {source}")]
    SchemaMismatch {
        stage: Stage,
        #[source]
        source: FeatureError,
    },

    /// Model evaluation failed
    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl PipelineError {
    /// Stage the request had reached when it failed
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::ModelUnavailable(_) => Stage::Received,
            PipelineError::SchemaMismatch { stage, .. } => *stage,
            PipelineError::Inference(_) => Stage::Scaled,
        }
    }
}

/// A hard failure tied to the request it happened on.
///
/// `request_id` is the id the pipeline logged the failure under.
#[derive(Debug, Error)]
#[error("Request {request_id} failed: {source}")]
pub struct PredictionFailure {
    pub request_id: Uuid,
    pub latency_us: u64,
    #[source]
    pub source: PipelineError,
}

impl PredictionFailure {
    pub fn stage(&self) -> Stage {
        self.source.stage()
    }

    /// Render for the caller under the same request id
    pub fn to_result(&self, unit: &str) -> PredictionResult {
        PredictionResult::errored(
            self.request_id,
            self.stage(),
            self.source.to_string(),
            unit,
            self.latency_us,
        )
    }
}

impl From<ArtifactError> for PipelineError {
    fn from(error: ArtifactError) -> Self {
        PipelineError::ModelUnavailable(error.to_string())
    }
}
