//! Feature Engineering Engine
//!
//! Turns raw used-car specifications into the exact numeric layout the
//! price model was trained on: an ordered schema, label encoding of
//! categorical columns and standard scaling of the assembled vector.

mod encoder;
mod error;
mod features;
mod record;
mod scaler;
mod schema;

pub use encoder::{CategoricalEncoder, Vocabulary};
pub use error::FeatureError;
pub use features::{FeatureAssembler, FeatureVector};
pub use record::{FieldValue, PredictionRequest};
pub use scaler::NumericScaler;
pub use schema::{FeatureSchema, FieldDependency, FieldKind, FieldSpec};
