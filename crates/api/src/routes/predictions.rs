//! Prediction Routes

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use feature_engine::PredictionRequest;
use price_pipeline::{PredictionResult, PredictionStatus};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};
use uuid::Uuid;

use crate::AppState;

/// Estimate a price for one car.
///
/// 200 with a price, 422 when fields were rejected, 500 when the
/// deployment itself is broken. A body that is not a JSON object of
/// fields keeps the extractor's status code but still gets a result body.
pub async fn create_prediction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> (StatusCode, Json<PredictionResult>) {
    let start = Instant::now();
    let pipeline = state.pipeline.current();
    let unit = &pipeline.metadata().unit;

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let result = PredictionResult::malformed(Uuid::new_v4(), rejection.body_text(), unit);
            warn!("[{}] malformed body: {}", result.request_id, rejection.body_text());
            record(&state, &result, start);
            return (rejection.status(), Json(result));
        }
    };

    let result = match pipeline.predict(&request) {
        Ok(result) => result,
        Err(failure) => {
            error!("Prediction failed: {}", failure);
            failure.to_result(unit)
        }
    };

    let status = match result.status {
        PredictionStatus::Ok => StatusCode::OK,
        PredictionStatus::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionStatus::Error => StatusCode::INTERNAL_SERVER_ERROR,
    };
    record(&state, &result, start);

    (status, Json(result))
}

fn record(state: &AppState, result: &PredictionResult, start: Instant) {
    let counter = match result.status {
        PredictionStatus::Ok => &state.counters.ok,
        PredictionStatus::Rejected => &state.counters.rejected,
        PredictionStatus::Error => &state.counters.errors,
    };
    counter.fetch_add(1, Ordering::Relaxed);

    metrics::counter!("price_predictions_total", "status" => result.status.as_str()).increment(1);
    metrics::histogram!("price_prediction_latency_seconds").record(start.elapsed().as_secs_f64());
}
