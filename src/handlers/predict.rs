//! Prediction handler

use axum::{body::Bytes, extract::State, Json};

use crate::{AppState, AppResult};
use crate::models::{self, FeaturePayload, PredictionResponse};

/// Score one feature payload.
///
/// The raw body is parsed here rather than through the `Json` extractor so
/// that malformed input still produces the structured error body.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictionResponse>> {
    let payload = FeaturePayload::from_body(&body)?;

    let model = state.store.get()?;
    let vector = payload.resolve(model.feature_names())?;
    let result = models::score(&vector, &model)?;

    tracing::debug!(
        prediction = result.label,
        probability = result.probability,
        "Prediction complete"
    );

    Ok(Json(PredictionResponse::from(result)))
}
