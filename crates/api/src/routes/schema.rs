//! Schema Routes

use axum::{extract::State, Json};
use price_pipeline::{form_options, FieldOptions};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Form description for clients
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub bundle: String,
    pub unit: String,
    pub fields: Vec<FieldOptions>,
}

/// Get the field list and allowed choices of the live bundle
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let pipeline = state.pipeline.current();

    Json(SchemaResponse {
        bundle: pipeline.metadata().name.clone(),
        unit: pipeline.metadata().unit.clone(),
        fields: form_options(pipeline.schema()),
    })
}
