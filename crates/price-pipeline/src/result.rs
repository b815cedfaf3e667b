//! Prediction Results

use data_validator::ValidationError;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Per-request processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Validated,
    Encoded,
    Scaled,
    Predicted,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Encoded => "encoded",
            Stage::Scaled => "scaled",
            Stage::Predicted => "predicted",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome class of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    /// A price was produced
    Ok,
    /// Input was invalid; the model was not called
    Rejected,
    /// Broken deployment (artifact drift or model failure)
    Error,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Ok => "ok",
            PredictionStatus::Rejected => "rejected",
            PredictionStatus::Error => "error",
        }
    }
}

/// Field-level reason a request was rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRejection {
    pub field: String,
    pub reason: String,
    pub detail: ValidationError,
}

impl From<ValidationError> for FieldRejection {
    fn from(error: ValidationError) -> Self {
        Self {
            field: error.field().to_string(),
            reason: error.to_string(),
            detail: error,
        }
    }
}

/// Price estimate returned to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub request_id: Uuid,
    pub status: PredictionStatus,
    /// Last stage reached
    pub stage: Stage,
    /// Non-negative price, present when status is `Ok`
    pub price: Option<f64>,
    /// Price rounded to two decimals with its unit, e.g. `7.79 lakh`
    pub display: Option<String>,
    /// Model output before the non-negative floor
    pub raw_price: Option<f64>,
    /// Whether a negative model output was floored to zero
    pub clamped: bool,
    pub unit: String,
    pub rejections: Vec<FieldRejection>,
    pub error: Option<String>,
    pub latency_us: u64,
}

impl PredictionResult {
    /// Successful estimate; negative model output is floored to zero
    pub fn done(request_id: Uuid, raw_price: f64, unit: &str, latency_us: u64) -> Self {
        let clamped = raw_price < 0.0;
        let price = raw_price.max(0.0);
        Self {
            request_id,
            status: PredictionStatus::Ok,
            stage: Stage::Done,
            price: Some(price),
            display: Some(format!("{:.2} {}", price, unit)),
            raw_price: Some(raw_price),
            clamped,
            unit: unit.to_string(),
            rejections: Vec::new(),
            error: None,
            latency_us,
        }
    }

    /// Request refused at validation
    pub fn rejected(request_id: Uuid, errors: Vec<ValidationError>, unit: &str, latency_us: u64) -> Self {
        Self {
            request_id,
            status: PredictionStatus::Rejected,
            stage: Stage::Received,
            price: None,
            display: None,
            raw_price: None,
            clamped: false,
            unit: unit.to_string(),
            rejections: errors.into_iter().map(FieldRejection::from).collect(),
            error: None,
            latency_us,
        }
    }

    /// Body that is not a field map at all; nothing could be validated
    pub fn malformed(request_id: Uuid, message: String, unit: &str) -> Self {
        Self {
            request_id,
            status: PredictionStatus::Rejected,
            stage: Stage::Received,
            price: None,
            display: None,
            raw_price: None,
            clamped: false,
            unit: unit.to_string(),
            rejections: Vec::new(),
            error: Some(message),
            latency_us: 0,
        }
    }

    /// Hard failure rendered for the caller
    pub fn errored(
        request_id: Uuid,
        stage: Stage,
        message: String,
        unit: &str,
        latency_us: u64,
    ) -> Self {
        Self {
            request_id,
            status: PredictionStatus::Error,
            stage,
            price: None,
            display: None,
            raw_price: None,
            clamped: false,
            unit: unit.to_string(),
            rejections: Vec::new(),
            error: Some(message),
            latency_us,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PredictionStatus::Ok
    }
}
