//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::store::ModelSource;

/// Expected number of input features (Wisconsin diagnostic dataset)
pub const DEFAULT_FEATURE_COUNT: usize = 30;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (local mode only)
    pub port: u16,

    /// Model parameter artifact on disk. `None` uses the bundled artifact.
    pub model_path: Option<PathBuf>,

    /// Required model dimensionality. `None` accepts any.
    pub feature_count: Option<usize>,

    /// Environment (development, production)
    pub environment: String,

    /// Tracing output format
    pub log_format: LogFormat,

    /// Set when running inside the Lambda execution environment
    pub lambda_runtime_api: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let lambda_runtime_api = env::var("AWS_LAMBDA_RUNTIME_API")
            .ok()
            .filter(|v| !v.is_empty());

        let log_format = match env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            _ if lambda_runtime_api.is_some() => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            model_path: env::var("MODEL_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),

            feature_count: parse_feature_count(env::var("MODEL_FEATURE_COUNT").ok().as_deref()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            log_format,
            lambda_runtime_api,
        }
    }

    /// Where the parameter store reads its artifact from
    pub fn model_source(&self) -> ModelSource {
        match &self.model_path {
            Some(path) => ModelSource::File(path.clone()),
            None => ModelSource::bundled(),
        }
    }

    /// Check if running under the Lambda runtime
    pub fn is_lambda(&self) -> bool {
        self.lambda_runtime_api.is_some()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// `0` disables the check, garbage falls back to the default.
fn parse_feature_count(raw: Option<&str>) -> Option<usize> {
    match raw.map(str::trim).and_then(|v| v.parse::<usize>().ok()) {
        Some(0) => None,
        Some(n) => Some(n),
        None => Some(DEFAULT_FEATURE_COUNT),
    }
}
