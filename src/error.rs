//! Error handling

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Invalid model artifact. Fatal: the service must not serve with it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("model parameters file not found: {0}")]
    NotFound(String),

    #[error("failed to read model parameters: {0}")]
    Io(#[from] std::io::Error),

    #[error("model parameters file is corrupted: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{coefficients} coefficients but {feature_names} feature names")]
    LengthMismatch { coefficients: usize, feature_names: usize },

    #[error("model defines {got} features, expected {expected}")]
    UnexpectedDimension { expected: usize, got: usize },

    #[error("model defines no features")]
    Empty,

    #[error("model parameters contain non-finite values")]
    NonFinite,

    #[error("duplicate feature name '{0}'")]
    DuplicateFeature(String),

    #[error("expected 2 class labels, got {0}")]
    ClassCount(usize),

    #[error("expected a single coefficient row, got {0} (multi-class models are not supported)")]
    MultiClass(usize),

    #[error("expected a single intercept, got {0}")]
    InterceptArity(usize),
}

/// Location of a rejected feature value
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureRef {
    Position(usize),
    Name(String),
}

impl fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureRef::Position(i) => write!(f, "at position {i}"),
            FeatureRef::Name(name) => write!(f, "for '{name}'"),
        }
    }
}

/// Bad request payload. Recoverable, reported back to the caller.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing request body")]
    MissingBody,

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("missing or malformed 'features' field")]
    MalformedFeatures,

    #[error("feature count mismatch: expected {expected}, got {got}")]
    CountMismatch { expected: usize, got: usize },

    #[error("{}", missing_features_message(.0))]
    MissingFeatures(Vec<String>),

    #[error("non-numeric feature value {0}")]
    NonNumeric(FeatureRef),
}

fn missing_features_message(names: &[String]) -> String {
    let noun = if names.len() > 1 { "features" } else { "feature" };
    format!("missing {}: {}", noun, names.join(", "))
}

/// Failures while evaluating the linear model
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    /// Unreachable once resolution has checked the length.
    #[error("feature vector has {got} values but the model has {expected} coefficients")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("feature values overflow the linear predictor")]
    NonFiniteScore,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::Configuration(err) => {
                tracing::error!("Model loading error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Model loading error: {err}"))
            }
            AppError::Scoring(err @ ScoringError::NonFiniteScore) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Scoring(err @ ScoringError::DimensionMismatch { .. }) => {
                tracing::error!("Invariant violation: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        error_response(status, &error_message)
    }
}

/// Structured error body shared by handlers and the panic layer
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "error": message,
        "status": status.as_u16()
    }));

    (status, body).into_response()
}
