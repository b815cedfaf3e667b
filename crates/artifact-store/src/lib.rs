//! Artifact Store
//!
//! Reads and writes the bundle of fitted artifacts (schema, label encoders,
//! scaler and model) produced by the offline training job.

mod bundle;
mod store;

pub use bundle::{ArtifactBundle, BundleMetadata, FORMAT_VERSION};
pub use store::{ArtifactFormat, ArtifactStore};

use std::path::PathBuf;
use thiserror::Error;

/// Artifact store errors
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Postcard error: {0}")]
    Postcard(String),
    #[error("Unsupported artifact format: {0}")]
    UnsupportedFormat(String),
    #[error("Unsupported bundle version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
