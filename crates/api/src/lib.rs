//! Used-Car Pricer API Server
//!
//! REST API in front of the prediction pipeline: form options for the
//! client, price estimates, artifact reload and Prometheus metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use price_pipeline::{PredictionPipeline, SharedPipeline};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod settings;
mod error;
pub mod rate_limit;
mod routes;

pub use settings::ServiceConfig;
pub use error::ApiError;
pub use rate_limit::{create_governor_config, RateLimitConfig};

/// Application state shared across handlers
pub struct AppState {
    /// Live prediction pipeline
    pub pipeline: SharedPipeline,
    /// Bundle re-read on reload
    pub artifact_path: PathBuf,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exposition, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub counters: RequestCounters,
}

impl AppState {
    /// Create new application state around an already-loaded pipeline
    pub fn new(
        pipeline: PredictionPipeline,
        artifact_path: impl Into<PathBuf>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            pipeline: SharedPipeline::new(pipeline),
            artifact_path: artifact_path.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
            counters: RequestCounters::default(),
        }
    }
}

/// Per-outcome request tallies reported by the health endpoint
#[derive(Debug, Default)]
pub struct RequestCounters {
    pub ok: AtomicU64,
    pub rejected: AtomicU64,
    pub errors: AtomicU64,
}

impl RequestCounters {
    fn snapshot(&self) -> PredictionCounts {
        PredictionCounts {
            ok: self.ok.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
    pub predictions: PredictionCounts,
}

/// Loaded bundle summary
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub bundle: String,
    pub kind: String,
    pub feature_count: usize,
    pub unit: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionCounts {
    pub ok: u64,
    pub rejected: u64,
    pub errors: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/api/v1/predictions", post(routes::predictions::create_prediction))
        .route("/api/v1/admin/reload", post(routes::admin::reload))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Create the router with per-IP rate limits on the write endpoints.
///
/// Requires the service to be built with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_rate_limited_router(
    state: Arc<AppState>,
    limits: &RateLimitConfig,
) -> Result<Router, ApiError> {
    let public = Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/schema", get(routes::schema::get_schema))
        .route("/metrics", get(metrics_handler));

    let predictions = Router::new()
        .route("/api/v1/predictions", post(routes::predictions::create_prediction))
        .layer(GovernorLayer {
            config: create_governor_config(limits)?,
        });

    let admin = Router::new()
        .route("/api/v1/admin/reload", post(routes::admin::reload))
        .layer(GovernorLayer {
            config: create_governor_config(&RateLimitConfig::strict())?,
        });

    Ok(public
        .merge(predictions)
        .merge(admin)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pipeline = state.pipeline.current();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            bundle: pipeline.metadata().name.clone(),
            kind: pipeline.model_kind().to_string(),
            feature_count: pipeline.schema().len(),
            unit: pipeline.metadata().unit.clone(),
        },
        predictions: state.counters.snapshot(),
    };

    Json(response)
}

/// Prometheus scrape endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::NOT_FOUND,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Initialize logging
pub fn init_logging(json: bool) -> Result<(), ApiError> {
    let result = if json {
        let subscriber = FmtSubscriber::builder()
            .json()
            .with_max_level(Level::INFO)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| ApiError::Logging(e.to_string()))
}

/// Run the server
///
/// The pipeline must already be loaded; the listener is only bound once
/// artifacts are known to be usable.
pub async fn run_server(
    config: ServiceConfig,
    pipeline: PredictionPipeline,
    metrics: Option<PrometheusHandle>,
) -> Result<(), ApiError> {
    info!(
        "Serving bundle={} model={} features={}",
        pipeline.metadata().name,
        pipeline.model_kind(),
        pipeline.schema().len()
    );

    let state = Arc::new(AppState::new(pipeline, config.artifact_path.clone(), metrics));
    let app = create_rate_limited_router(state, &config.rate_limit)?;

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
