//! Diagnosis Service
//!
//! Serves a pre-trained logistic regression model for breast-cancer
//! diagnosis. Runs behind API Gateway on AWS Lambda, or as a plain HTTP
//! server when started outside the Lambda environment.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DIAGNOSIS SERVICE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  API Gateway / HTTP                                         │
//! │        │                                                    │
//! │        ▼                                                    │
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────────────┐  │
//! │  │  Router   │──▶│   Feature    │──▶│  Scoring          │  │
//! │  │  (Axum)   │   │  Resolution  │   │  (linear+sigmoid) │  │
//! │  └───────────┘   └──────┬───────┘   └─────────┬─────────┘  │
//! │                         └──────────┬──────────┘             │
//! │                                    ▼                        │
//! │                          ┌──────────────────┐               │
//! │                          │ Parameter Store  │               │
//! │                          │ (loaded once)    │               │
//! │                          └──────────────────┘               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
    http::StatusCode,
    response::Response,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use config::{Config, LogFormat};
use store::ParameterStore;

pub use error::AppResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_tracing(config.log_format);

    tracing::info!(
        environment = %config.environment,
        lambda = config.is_lambda(),
        "Diagnosis service starting..."
    );

    if config.is_production() && config.model_path.is_none() {
        tracing::warn!("MODEL_PATH not set, serving the bundled model artifact");
    }

    // Cold start: never accept traffic with an invalid model
    let store = Arc::new(ParameterStore::new(config.model_source(), config.feature_count));
    if let Err(err) = store.get() {
        tracing::error!("Model loading error: {}", err);
        return Err(err).context("refusing to serve without valid model parameters");
    }

    let app = create_router(AppState { store });

    if config.is_lambda() {
        tracing::info!("Handing over to the Lambda runtime");
        return lambda_http::run(app)
            .await
            .map_err(|err| anyhow::anyhow!("lambda runtime error: {err}"));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "diagnosis_service=debug,tower_http=debug".into());

    let fmt_layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ParameterStore>,
}

/// Panics become a structured 500; the process keeps serving
fn handle_panic(_: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    error::error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predict", post(handlers::predict::predict))
        // API Gateway proxy integrations often map the function to the stage root
        .route("/", post(handlers::predict::predict))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
