//! Administrative Routes

use axum::{extract::State, Json};
use price_pipeline::PredictionPipeline;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub bundle: String,
    pub previous: String,
    pub model: String,
}

/// Re-read the artifact bundle and swap it in.
///
/// In-flight requests finish on the pipeline they started with. A bundle
/// that fails to load leaves the current pipeline serving.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let path = state.artifact_path.clone();
    info!("Reloading artifacts from {}", path.display());

    let pipeline = tokio::task::spawn_blocking(move || PredictionPipeline::load(path))
        .await
        .map_err(|e| ApiError::Reload(e.to_string()))?
        .map_err(|e| {
            warn!("Keeping current pipeline: {}", e);
            ApiError::Reload(e.to_string())
        })?;

    let bundle = pipeline.metadata().name.clone();
    let model = pipeline.model_kind().to_string();
    let previous = state.pipeline.swap(pipeline);

    Ok(Json(ReloadResponse {
        bundle,
        previous: previous.metadata().name.clone(),
        model,
    }))
}
