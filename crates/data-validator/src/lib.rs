//! Request Validation
//!
//! Checks raw price prediction requests against the feature schema before
//! anything is encoded: presence, types, numeric ranges and categorical
//! choices.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationResult, Validator};
