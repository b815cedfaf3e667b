//! Prediction Pipeline
//!
//! `Received → Validated → Encoded → Scaled → Predicted → Done`. Invalid
//! input stops at validation and is returned as a rejection; anything that
//! fails after validation means the artifacts disagree and is a hard error.

use crate::error::{PipelineError, PredictionFailure};
use crate::result::{PredictionResult, Stage};
use artifact_store::{ArtifactBundle, ArtifactStore, BundleMetadata};
use data_validator::Validator;
use feature_engine::{
    CategoricalEncoder, FeatureAssembler, FeatureSchema, FeatureVector, NumericScaler,
    PredictionRequest,
};
use inference_engine::{InferenceEngine, InferenceError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Immutable set of loaded artifacts plus the request state machine
#[derive(Debug)]
pub struct PredictionPipeline {
    metadata: BundleMetadata,
    schema: Arc<FeatureSchema>,
    encoder: CategoricalEncoder,
    scaler: NumericScaler,
    validator: Validator,
    engine: InferenceEngine,
}

impl PredictionPipeline {
    /// Load a bundle from disk and build a pipeline from it
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let bundle = ArtifactStore::open(path.as_ref())?.load()?;
        Self::from_bundle(bundle)
    }

    /// Build from a decoded bundle, refusing inconsistent artifacts
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, PipelineError> {
        check_consistency(&bundle.schema, &bundle.encoder, &bundle.scaler)?;

        let engine = InferenceEngine::load(bundle.model, bundle.schema.len())
            .map_err(model_unavailable)?;

        Self::assemble_parts(
            bundle.metadata,
            bundle.schema,
            bundle.encoder,
            bundle.scaler,
            engine,
        )
    }

    /// Build from parts with an already-constructed engine
    pub fn from_parts(
        metadata: BundleMetadata,
        schema: FeatureSchema,
        encoder: CategoricalEncoder,
        scaler: NumericScaler,
        engine: InferenceEngine,
    ) -> Result<Self, PipelineError> {
        check_consistency(&schema, &encoder, &scaler)?;
        Self::assemble_parts(metadata, schema, encoder, scaler, engine)
    }

    fn assemble_parts(
        metadata: BundleMetadata,
        schema: FeatureSchema,
        encoder: CategoricalEncoder,
        scaler: NumericScaler,
        engine: InferenceEngine,
    ) -> Result<Self, PipelineError> {
        if engine.num_features() != schema.len() {
            return Err(PipelineError::ModelUnavailable(format!(
                "model expects {} features, schema has {}",
                engine.num_features(),
                schema.len()
            )));
        }

        info!(
            "Pipeline ready: bundle={} fields={} model={}",
            metadata.name,
            schema.len(),
            engine.kind()
        );

        let schema = Arc::new(schema);
        Ok(Self {
            metadata,
            validator: Validator::new(Arc::clone(&schema)),
            schema,
            encoder,
            scaler,
            engine,
        })
    }

    /// Run one request through the pipeline.
    ///
    /// Returns `Ok` for both priced and rejected requests; `Err` only when
    /// the loaded artifacts are broken. Either way the request id matches
    /// the one in the logs.
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PredictionFailure> {
        let start = Instant::now();
        let request_id = Uuid::new_v4();

        self.run(request_id, start, request)
            .map_err(|source| PredictionFailure {
                request_id,
                latency_us: elapsed_us(start),
                source,
            })
    }

    fn run(
        &self,
        request_id: Uuid,
        start: Instant,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PipelineError> {
        debug!("[{}] {}", request_id, Stage::Received);

        let validation = self.validator.validate(request);
        if !validation.valid {
            warn!(
                "[{}] rejected: {}",
                request_id,
                validation
                    .errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            );
            return Ok(PredictionResult::rejected(
                request_id,
                validation.errors,
                &self.metadata.unit,
                elapsed_us(start),
            ));
        }
        debug!("[{}] {}", request_id, Stage::Validated);

        let encoded = self.assemble(request).map_err(|source| {
            error!("[{}] encoding failed after validation: {}", request_id, source);
            PipelineError::SchemaMismatch {
                stage: Stage::Validated,
                source,
            }
        })?;
        debug!("[{}] {}", request_id, Stage::Encoded);

        let scaled = self.scaler.transform(encoded.as_slice()).map_err(|source| {
            error!("[{}] scaling failed: {}", request_id, source);
            PipelineError::SchemaMismatch {
                stage: Stage::Encoded,
                source,
            }
        })?;
        debug!("[{}] {}", request_id, Stage::Scaled);

        let inference = self.engine.predict(&scaled).map_err(|e| {
            error!("[{}] inference failed: {}", request_id, e);
            e
        })?;
        debug!("[{}] {} raw={}", request_id, Stage::Predicted, inference.value);

        let result = PredictionResult::done(
            request_id,
            inference.value,
            &self.metadata.unit,
            elapsed_us(start),
        );
        if result.clamped {
            warn!(
                "[{}] negative model output {} clamped to zero",
                request_id, inference.value
            );
        }
        debug!("[{}] {} price={:?}", request_id, Stage::Done, result.price);

        Ok(result)
    }

    /// Encode a record into schema order without scaling
    pub fn assemble(
        &self,
        request: &PredictionRequest,
    ) -> Result<FeatureVector, feature_engine::FeatureError> {
        FeatureAssembler::new(&self.schema, &self.encoder).assemble(request)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn encoder(&self) -> &CategoricalEncoder {
        &self.encoder
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }

    /// Model family name of the loaded engine
    pub fn model_kind(&self) -> &'static str {
        self.engine.kind()
    }
}

/// Cross-check schema, encoder and scaler before serving anything
fn check_consistency(
    schema: &FeatureSchema,
    encoder: &CategoricalEncoder,
    scaler: &NumericScaler,
) -> Result<(), PipelineError> {
    if scaler.len() != schema.len() {
        return Err(PipelineError::ModelUnavailable(format!(
            "scaler has {} parameters, schema has {} features",
            scaler.len(),
            schema.len()
        )));
    }

    let mut categorical = HashSet::new();
    for field in schema.categorical_fields() {
        categorical.insert(field.name.as_str());

        let vocabulary = encoder.vocabulary(&field.name).ok_or_else(|| {
            PipelineError::ModelUnavailable(format!("no encoder for field {}", field.name))
        })?;

        if let Some(value) = field.allowed_values.iter().find(|v| !vocabulary.contains(v)) {
            return Err(PipelineError::ModelUnavailable(format!(
                "field {} offers {:?} which the encoder was not fitted on",
                field.name, value
            )));
        }
    }

    if let Some(extra) = encoder.fields().find(|f| !categorical.contains(f)) {
        return Err(PipelineError::ModelUnavailable(format!(
            "encoder has a vocabulary for {} which is not a categorical schema field",
            extra
        )));
    }

    Ok(())
}

fn model_unavailable(error: InferenceError) -> PipelineError {
    match error {
        InferenceError::ModelUnavailable(msg) => PipelineError::ModelUnavailable(msg),
        other => PipelineError::ModelUnavailable(other.to_string()),
    }
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PredictionStatus;
    use data_validator::ValidationError;
    use feature_engine::{FieldSpec, Vocabulary};
    use inference_engine::{LinearRegressor, ModelArtifact, Regressor};
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed value and counts calls
    struct Fixed {
        value: f64,
        width: usize,
        calls: Arc<AtomicUsize>,
    }

    impl Regressor for Fixed {
        fn num_features(&self) -> usize {
            self.width
        }

        fn predict(&self, _features: &[f64]) -> Result<f64, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }

        fn kind(&self) -> &'static str {
            "fixed"
        }
    }

    fn metadata() -> BundleMetadata {
        BundleMetadata {
            name: "test".to_string(),
            unit: "lakh".to_string(),
            trained_at: None,
        }
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            FieldSpec::categorical("Fuel type", ["Petrol", "Diesel"]),
            FieldSpec::numeric("Kms Driven", Some((100.0, 100_000.0))),
            FieldSpec::categorical("Color", ["White", "Red"]),
        ])
        .unwrap()
    }

    fn encoder() -> CategoricalEncoder {
        CategoricalEncoder::default()
            .with_field("Fuel type", Vocabulary::fit(["Petrol", "Diesel"]).unwrap())
            .with_field("Color", Vocabulary::fit(["White", "Red", "Black"]).unwrap())
    }

    fn request() -> PredictionRequest {
        PredictionRequest::new()
            .with("Color", "White")
            .with("Kms Driven", 40_000i64)
            .with("Fuel type", "Diesel")
    }

    fn fixed_pipeline(value: f64) -> (PredictionPipeline, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = Fixed {
            value,
            width: 3,
            calls: Arc::clone(&calls),
        };
        let engine = InferenceEngine::from_regressor(Box::new(model), 3).unwrap();
        let pipeline = PredictionPipeline::from_parts(
            metadata(),
            schema(),
            encoder(),
            NumericScaler::identity(3).unwrap(),
            engine,
        )
        .unwrap();
        (pipeline, calls)
    }

    #[test]
    fn test_linear_end_to_end() {
        let bundle = ArtifactBundle::new(
            metadata(),
            schema(),
            encoder(),
            NumericScaler::new(vec![0.5, 50_000.0, 1.0], vec![0.5, 10_000.0, 1.0]).unwrap(),
            ModelArtifact::Linear(LinearRegressor::new(vec![1.0, 1.0, 1.0], 5.0).unwrap()),
        );
        let pipeline = PredictionPipeline::from_bundle(bundle).unwrap();

        // Diesel=0 -> -1, 40000 -> -1, White=2 -> 1
        let result = pipeline.predict(&request()).unwrap();
        assert_eq!(result.status, PredictionStatus::Ok);
        assert!((result.price.unwrap() - 4.0).abs() < 1e-9);
        assert!(!result.clamped);
    }

    #[test]
    fn test_rejected_request_never_reaches_model() {
        let (pipeline, calls) = fixed_pipeline(3.0);
        let result = pipeline.predict(&request().with("Color", "Holographic")).unwrap();

        assert_eq!(result.status, PredictionStatus::Rejected);
        assert_eq!(result.rejections.len(), 1);
        assert_eq!(result.rejections[0].field, "Color");
        assert!(matches!(
            result.rejections[0].detail,
            ValidationError::UnknownCategory { .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_out_of_range_rejected_before_encoding() {
        let (pipeline, calls) = fixed_pipeline(3.0);
        let result = pipeline.predict(&request().with("Kms Driven", -500i64)).unwrap();

        assert_eq!(result.status, PredictionStatus::Rejected);
        assert_eq!(result.stage, Stage::Received);
        assert!(matches!(
            result.rejections[0].detail,
            ValidationError::OutOfRange { .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_negative_output_clamped() {
        let (pipeline, calls) = fixed_pipeline(-2.5);
        let result = pipeline.predict(&request()).unwrap();

        assert_eq!(result.status, PredictionStatus::Ok);
        assert_eq!(result.price, Some(0.0));
        assert_eq!(result.raw_price, Some(-2.5));
        assert!(result.clamped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_model_failure_keeps_request_id() {
        let (pipeline, calls) = fixed_pipeline(f64::NAN);
        let failure = pipeline.predict(&request()).unwrap_err();

        assert!(matches!(
            failure.source,
            PipelineError::Inference(InferenceError::InferenceFailed(_))
        ));
        assert_eq!(failure.stage(), Stage::Scaled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let result = failure.to_result("lakh");
        assert_eq!(result.status, PredictionStatus::Error);
        assert_eq!(result.request_id, failure.request_id);
        assert_eq!(result.latency_us, failure.latency_us);
        assert!(result.price.is_none());
        assert!(result.error.unwrap().contains("non-finite"));
    }

    #[test]
    fn test_scaler_width_mismatch_refuses_to_load() {
        let bundle = ArtifactBundle::new(
            metadata(),
            schema(),
            encoder(),
            NumericScaler::identity(4).unwrap(),
            ModelArtifact::Linear(LinearRegressor::new(vec![1.0; 3], 0.0).unwrap()),
        );
        assert!(matches!(
            PredictionPipeline::from_bundle(bundle),
            Err(PipelineError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_model_width_mismatch_refuses_to_load() {
        let bundle = ArtifactBundle::new(
            metadata(),
            schema(),
            encoder(),
            NumericScaler::identity(3).unwrap(),
            ModelArtifact::Linear(LinearRegressor::new(vec![1.0; 5], 0.0).unwrap()),
        );
        assert!(matches!(
            PredictionPipeline::from_bundle(bundle),
            Err(PipelineError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_allowed_values_outside_vocabulary_refuse_to_load() {
        let drifted = FeatureSchema::new(vec![
            FieldSpec::categorical("Fuel type", ["Petrol", "Diesel", "Electric"]),
            FieldSpec::numeric("Kms Driven", Some((100.0, 100_000.0))),
            FieldSpec::categorical("Color", ["White", "Red"]),
        ])
        .unwrap();
        let bundle = ArtifactBundle::new(
            metadata(),
            drifted,
            encoder(),
            NumericScaler::identity(3).unwrap(),
            ModelArtifact::Linear(LinearRegressor::new(vec![1.0; 3], 0.0).unwrap()),
        );
        let err = PredictionPipeline::from_bundle(bundle).unwrap_err();
        assert!(err.to_string().contains("Electric"));
    }

    #[test]
    fn test_missing_or_extra_encoder_refuses_to_load() {
        let partial = CategoricalEncoder::default()
            .with_field("Fuel type", Vocabulary::fit(["Petrol", "Diesel"]).unwrap());
        assert!(check_consistency(&schema(), &partial, &NumericScaler::identity(3).unwrap()).is_err());

        let extra = encoder().with_field("Kms Driven", Vocabulary::fit(["1"]).unwrap());
        assert!(check_consistency(&schema(), &extra, &NumericScaler::identity(3).unwrap()).is_err());
    }

    #[test]
    fn test_assembly_matches_schema_order() {
        let (pipeline, _) = fixed_pipeline(1.0);
        let vector = pipeline.assemble(&request()).unwrap();
        assert_eq!(vector.len(), pipeline.schema().len());
        // Diesel=0, km, White=2 (vocabulary Black, Red, White)
        assert_eq!(vector.values, vec![0.0, 40_000.0, 2.0]);
    }

    proptest! {
        #[test]
        fn prop_price_never_negative(value in -1.0e6f64..1.0e6) {
            let (pipeline, _) = fixed_pipeline(value);
            let result = pipeline.predict(&request()).unwrap();
            prop_assert!(result.price.unwrap() >= 0.0);
            prop_assert_eq!(result.clamped, value < 0.0);
            prop_assert_eq!(result.raw_price, Some(value));
        }
    }
}
