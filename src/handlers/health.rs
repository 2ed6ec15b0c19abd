//! Health check handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    feature_count: Option<usize>,
    model_loaded_at: Option<DateTime<Utc>>,
}

/// Reports model state without forcing a load
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let loaded = state.store.loaded();

    Json(HealthResponse {
        status: if loaded.is_some() { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().timestamp(),
        model_loaded: loaded.is_some(),
        feature_count: loaded.map(|m| m.parameters.feature_count()),
        model_loaded_at: loaded.map(|m| m.loaded_at),
    })
}
