//! Artifact Store Implementation

use crate::bundle::{ArtifactBundle, FORMAT_VERSION};
use crate::ArtifactError;
use inference_engine::ModelArtifact;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk encoding of a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Human-editable JSON
    Json,
    /// Compact postcard binary
    Postcard,
}

impl ArtifactFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(ArtifactFormat::Json),
            Some("postcard") | Some("bin") => Ok(ArtifactFormat::Postcard),
            other => Err(ArtifactError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Decode a bundle, rejecting unsupported versions
    pub fn decode(&self, bytes: &[u8]) -> Result<ArtifactBundle, ArtifactError> {
        let bundle: ArtifactBundle = match self {
            ArtifactFormat::Json => serde_json::from_slice(bytes)?,
            ArtifactFormat::Postcard => postcard::from_bytes(bytes)
                .map_err(|e| ArtifactError::Postcard(e.to_string()))?,
        };

        if bundle.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: bundle.format_version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(bundle)
    }

    pub fn encode(&self, bundle: &ArtifactBundle) -> Result<Vec<u8>, ArtifactError> {
        match self {
            ArtifactFormat::Json => Ok(serde_json::to_vec_pretty(bundle)?),
            ArtifactFormat::Postcard => {
                postcard::to_allocvec(bundle).map_err(|e| ArtifactError::Postcard(e.to_string()))
            }
        }
    }
}

/// File-backed store for one artifact bundle
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
    format: ArtifactFormat,
}

impl ArtifactStore {
    /// Open a store at a path; the extension selects the format
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let path = path.into();
        let format = ArtifactFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format
    }

    /// Read and decode the bundle.
    ///
    /// Relative ONNX model paths are resolved against the bundle's directory.
    pub fn load(&self) -> Result<ArtifactBundle, ArtifactError> {
        info!("Loading artifact bundle from {}", self.path.display());

        let bytes = std::fs::read(&self.path).map_err(|source| ArtifactError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut bundle = self.format.decode(&bytes)?;

        if let ModelArtifact::Onnx { path, .. } = &mut bundle.model {
            if path.is_relative() {
                if let Some(dir) = self.path.parent() {
                    *path = dir.join(&*path);
                }
            }
        }

        debug!(
            "Loaded bundle {} ({} fields, {} bytes)",
            bundle.metadata.name,
            bundle.schema.len(),
            bytes.len()
        );
        Ok(bundle)
    }

    /// Encode and write the bundle
    pub fn save(&self, bundle: &ArtifactBundle) -> Result<(), ArtifactError> {
        let bytes = self.format.encode(bundle)?;
        std::fs::write(&self.path, &bytes).map_err(|source| ArtifactError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "Saved bundle {} to {} ({} bytes)",
            bundle.metadata.name,
            self.path.display(),
            bytes.len()
        );
        Ok(())
    }
}
