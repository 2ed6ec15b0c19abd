//! Data models

pub mod parameters;
pub mod features;
pub mod prediction;

pub use parameters::ModelParameters;
pub use features::{FeaturePayload, FeatureVector};
pub use prediction::{score, PredictionResponse};
