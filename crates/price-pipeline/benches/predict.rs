use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::PredictionRequest;
use price_pipeline::PredictionPipeline;
use std::path::PathBuf;

fn bench_predict(c: &mut Criterion) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../artifacts/cardekho_bundle.json");
    let pipeline = PredictionPipeline::load(path).expect("sample bundle loads");

    let request = PredictionRequest::new()
        .with("Fuel type", "Diesel")
        .with("body type", "SUV")
        .with("transmission", "Automatic")
        .with("ownerNo", 2i64)
        .with("Brand", "Mahindra")
        .with("model", "XUV500")
        .with("modelYear", 2016i64)
        .with("Insurance Validity", "Third Party")
        .with("Kms Driven", 85_000i64)
        .with("Mileage", 15i64)
        .with("Seats", 7i64)
        .with("Color", "Black")
        .with("City", "Delhi");

    c.bench_function("predict_linear", |b| {
        b.iter(|| pipeline.predict(black_box(&request)))
    });

    let rejected = request.clone().with("Color", "Holographic");
    c.bench_function("predict_rejected", |b| {
        b.iter(|| pipeline.predict(black_box(&rejected)))
    });
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
