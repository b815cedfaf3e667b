use artifact_store::{ArtifactStore, FORMAT_VERSION};
use data_validator::ValidationError;
use feature_engine::{FieldKind, PredictionRequest};
use price_pipeline::{form_options, PipelineError, PredictionPipeline, PredictionStatus, Stage};
use std::path::PathBuf;

fn bundle_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts/cardekho_bundle.json")
}

fn pipeline() -> PredictionPipeline {
    PredictionPipeline::load(bundle_path()).unwrap()
}

fn swift() -> PredictionRequest {
    PredictionRequest::new()
        .with("Fuel type", "Petrol")
        .with("body type", "Hatchback")
        .with("transmission", "Manual")
        .with("ownerNo", 1i64)
        .with("Brand", "Maruti")
        .with("model", "Swift")
        .with("modelYear", 2018i64)
        .with("Insurance Validity", "Comprehensive")
        .with("Kms Driven", 40_000i64)
        .with("Mileage", 20i64)
        .with("Seats", 5i64)
        .with("Color", "White")
        .with("City", "Pune")
}

#[test]
fn known_car_gets_a_price() {
    let result = pipeline().predict(&swift()).unwrap();

    assert_eq!(result.status, PredictionStatus::Ok);
    assert_eq!(result.stage, Stage::Done);
    let price = result.price.unwrap();
    assert!(price.is_finite());
    assert!(price >= 0.0);
    assert_eq!(result.unit, "lakh");
}

#[test]
fn unseen_color_is_rejected_by_name() {
    let result = pipeline()
        .predict(&swift().with("Color", "Holographic"))
        .unwrap();

    assert_eq!(result.status, PredictionStatus::Rejected);
    assert!(result.price.is_none());
    assert_eq!(result.rejections.len(), 1);
    assert_eq!(result.rejections[0].field, "Color");
    assert_eq!(
        result.rejections[0].detail,
        ValidationError::UnknownCategory {
            field: "Color".to_string(),
            value: "Holographic".to_string(),
        }
    );
}

#[test]
fn negative_kilometers_rejected_before_encoding() {
    let result = pipeline().predict(&swift().with("Kms Driven", -500i64)).unwrap();

    assert_eq!(result.status, PredictionStatus::Rejected);
    assert_eq!(result.stage, Stage::Received);
    assert_eq!(
        result.rejections[0].detail,
        ValidationError::OutOfRange {
            field: "Kms Driven".to_string(),
            value: -500.0,
            min: 100.0,
            max: 100_000.0,
        }
    );
}

#[test]
fn every_rejection_is_reported() {
    let mut request = swift().with("Seats", 40i64).with("Fuel type", "Hydrogen");
    request.remove("City");

    let result = pipeline().predict(&request).unwrap();
    let mut fields: Vec<&str> = result.rejections.iter().map(|r| r.field.as_str()).collect();
    fields.sort();
    assert_eq!(fields, vec!["City", "Fuel type", "Seats"]);
}

#[test]
fn assembled_vector_follows_schema_order() {
    let pipeline = pipeline();
    let vector = pipeline.assemble(&swift()).unwrap();
    assert_eq!(vector.len(), pipeline.schema().len());

    // Petrol, Hatchback, Manual, 1, Maruti, Swift, 2018, Comprehensive, 40000, 20, 5, White, Pune
    assert_eq!(
        vector.values,
        vec![4.0, 2.0, 1.0, 1.0, 7.0, 17.0, 2018.0, 0.0, 40_000.0, 20.0, 5.0, 6.0, 6.0]
    );
}

#[test]
fn prediction_is_deterministic() {
    let pipeline = pipeline();
    let a = pipeline.predict(&swift()).unwrap();
    let b = pipeline.predict(&swift()).unwrap();
    assert_eq!(a.price, b.price);
    assert_ne!(a.request_id, b.request_id);
}

#[test]
fn form_options_match_vocabulary() {
    let pipeline = pipeline();
    for option in form_options(pipeline.schema()) {
        if option.kind == FieldKind::Categorical {
            let vocabulary = pipeline.encoder().vocabulary(&option.name).unwrap();
            assert!(option.choices.iter().all(|c| vocabulary.contains(c)));
        } else {
            assert!(option.range.is_some());
        }
    }
}

#[test]
fn postcard_bundle_behaves_like_json() {
    let bundle = ArtifactStore::open(bundle_path()).unwrap().load().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("bundle.postcard")).unwrap();
    store.save(&bundle).unwrap();

    let from_postcard = PredictionPipeline::load(store.path()).unwrap();
    let a = from_postcard.predict(&swift()).unwrap();
    let b = pipeline().predict(&swift()).unwrap();
    assert_eq!(a.price, b.price);
}

#[test]
fn scaler_width_mismatch_fails_at_startup() {
    let mut bundle = ArtifactStore::open(bundle_path()).unwrap().load().unwrap();
    bundle.scaler = feature_engine::NumericScaler::identity(12).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("drifted.json")).unwrap();
    store.save(&bundle).unwrap();

    let err = PredictionPipeline::load(store.path()).unwrap_err();
    assert!(matches!(err, PipelineError::ModelUnavailable(ref msg) if msg.contains("scaler")));
}

#[test]
fn unsupported_version_fails_at_startup() {
    let mut bundle = ArtifactStore::open(bundle_path()).unwrap().load().unwrap();
    bundle.format_version = FORMAT_VERSION + 1;

    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("future.json")).unwrap();
    store.save(&bundle).unwrap();

    assert!(matches!(
        PredictionPipeline::load(store.path()),
        Err(PipelineError::ModelUnavailable(_))
    ));
}

#[test]
fn missing_bundle_fails_at_startup() {
    assert!(matches!(
        PredictionPipeline::load("/nonexistent/bundle.json"),
        Err(PipelineError::ModelUnavailable(_))
    ));
}
