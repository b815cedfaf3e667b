//! Used-Car Price Prediction Pipeline
//!
//! Orchestrates validation, label encoding, scaling and inference over a
//! bundle of fitted artifacts loaded once at start-up.

mod error;
mod options;
mod pipeline;
mod result;
mod shared;

pub use error::{PipelineError, PredictionFailure};
pub use options::{form_options, FieldOptions};
pub use pipeline::PredictionPipeline;
pub use result::{FieldRejection, PredictionResult, PredictionStatus, Stage};
pub use shared::SharedPipeline;
