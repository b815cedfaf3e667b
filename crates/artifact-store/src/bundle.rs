//! Artifact Bundle

use feature_engine::{CategoricalEncoder, FeatureSchema, NumericScaler};
use inference_engine::ModelArtifact;
use serde::{Deserialize, Serialize};

/// Bundle layout version this build reads and writes
pub const FORMAT_VERSION: u32 = 1;

/// Descriptive information about a fitted bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// Bundle name shown in health output
    pub name: String,
    /// Unit of the predicted price (e.g. "lakh")
    pub unit: String,
    /// When the offline fit ran, as reported by the trainer
    #[serde(default)]
    pub trained_at: Option<String>,
}

/// The four fitted artifacts produced together at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub format_version: u32,
    pub metadata: BundleMetadata,
    pub schema: FeatureSchema,
    pub encoder: CategoricalEncoder,
    pub scaler: NumericScaler,
    pub model: ModelArtifact,
}

impl ArtifactBundle {
    /// Assemble a bundle at the current format version
    pub fn new(
        metadata: BundleMetadata,
        schema: FeatureSchema,
        encoder: CategoricalEncoder,
        scaler: NumericScaler,
        model: ModelArtifact,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            metadata,
            schema,
            encoder,
            scaler,
            model,
        }
    }
}
