//! Scoring - linear predictor, sigmoid and threshold

use std::collections::BTreeMap;

use serde::Serialize;

use super::features::FeatureVector;
use super::parameters::ModelParameters;
use crate::error::ScoringError;

/// Probability at or above which the positive class is predicted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Outcome of scoring one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult<'a> {
    pub label: i64,
    pub probability: f64,
    pub metadata: &'a BTreeMap<String, String>,
}

/// Success body returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub prediction: i64,
    pub probability: f64,
    pub model_metadata: BTreeMap<String, String>,
}

impl From<PredictionResult<'_>> for PredictionResponse {
    fn from(result: PredictionResult<'_>) -> Self {
        Self {
            prediction: result.label,
            probability: result.probability,
            model_metadata: result.metadata.clone(),
        }
    }
}

/// Logistic function, split on the sign of `z` so `exp` never sees a
/// large positive argument.
pub fn sigmoid(z: f64) -> f64 {
    if z < 0.0 {
        let e = z.exp();
        e / (1.0 + e)
    } else {
        1.0 / (1.0 + (-z).exp())
    }
}

/// `intercept + coefficients · vector`
pub fn linear_predictor(vector: &FeatureVector, params: &ModelParameters) -> Result<f64, ScoringError> {
    if vector.len() != params.coefficients().len() {
        return Err(ScoringError::DimensionMismatch {
            expected: params.coefficients().len(),
            got: vector.len(),
        });
    }

    let z = params
        .coefficients()
        .iter()
        .zip(vector.as_slice())
        .fold(params.intercept(), |acc, (coef, value)| acc + coef * value);

    // inf - inf from extreme but finite inputs
    if z.is_nan() {
        return Err(ScoringError::NonFiniteScore);
    }

    Ok(z)
}

/// Score a resolved feature vector
pub fn score<'a>(vector: &FeatureVector, params: &'a ModelParameters) -> Result<PredictionResult<'a>, ScoringError> {
    let probability = sigmoid(linear_predictor(vector, params)?);

    Ok(PredictionResult {
        label: params.class_label(probability >= DECISION_THRESHOLD),
        probability,
        metadata: params.metadata(),
    })
}
