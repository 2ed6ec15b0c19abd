//! Parameter store - loads the model artifact once per process

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::error::ConfigurationError;
use crate::models::ModelParameters;

/// Reference artifact compiled into the binary
const BUNDLED_ARTIFACT: &str = include_str!("../model/model_parameters.json");

/// Where the artifact comes from
#[derive(Debug, Clone)]
pub enum ModelSource {
    File(PathBuf),
    Embedded(&'static str),
}

impl ModelSource {
    pub fn bundled() -> Self {
        ModelSource::Embedded(BUNDLED_ARTIFACT)
    }

    fn describe(&self) -> String {
        match self {
            ModelSource::File(path) => path.display().to_string(),
            ModelSource::Embedded(_) => "<bundled>".to_string(),
        }
    }

    fn read(&self) -> Result<String, ConfigurationError> {
        match self {
            ModelSource::File(path) => std::fs::read_to_string(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConfigurationError::NotFound(path.display().to_string()),
                _ => ConfigurationError::Io(e),
            }),
            ModelSource::Embedded(raw) => Ok((*raw).to_string()),
        }
    }
}

/// Parameters plus load bookkeeping
#[derive(Debug)]
pub struct LoadedModel {
    pub parameters: Arc<ModelParameters>,
    pub loaded_at: DateTime<Utc>,
}

/// Write-once holder for the model parameters.
///
/// The first successful [`ParameterStore::get`] reads and validates the
/// source; later calls return the cached instance. Concurrent first callers
/// block until the single initialiser finishes. Failed loads are not
/// cached.
#[derive(Debug)]
pub struct ParameterStore {
    source: ModelSource,
    expected_features: Option<usize>,
    cell: OnceCell<LoadedModel>,
}

impl ParameterStore {
    pub fn new(source: ModelSource, expected_features: Option<usize>) -> Self {
        Self {
            source,
            expected_features,
            cell: OnceCell::new(),
        }
    }

    /// Cached parameters, loading them on first use
    pub fn get(&self) -> Result<Arc<ModelParameters>, ConfigurationError> {
        self.cell
            .get_or_try_init(|| self.load())
            .map(|loaded| Arc::clone(&loaded.parameters))
    }

    /// Load state without triggering a load
    pub fn loaded(&self) -> Option<&LoadedModel> {
        self.cell.get()
    }

    fn load(&self) -> Result<LoadedModel, ConfigurationError> {
        let started = Instant::now();
        let source = self.source.describe();
        tracing::info!("Loading model parameters from {}", source);

        let raw = self.source.read()?;
        let parameters = ModelParameters::from_json(&raw, self.expected_features)?;

        tracing::info!(
            source = %source,
            features = parameters.feature_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model parameters loaded"
        );

        Ok(LoadedModel {
            parameters: Arc::new(parameters),
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FEATURE_COUNT;
    use crate::models::parameters::tests::TWO_FEATURE_ARTIFACT;
    use std::io::Write;

    fn artifact_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_bundled_artifact_loads() {
        let store = ParameterStore::new(ModelSource::bundled(), Some(DEFAULT_FEATURE_COUNT));
        let params = store.get().unwrap();
        assert_eq!(params.feature_count(), 30);
        assert_eq!(params.feature_names()[0], "mean radius");
        assert!(params.metadata().contains_key("accuracy"));
        assert!(params.metadata().contains_key("roc_auc"));
        assert!(params.metadata().contains_key("trained_at"));
        assert!(params.metadata().contains_key("target_names"));
    }

    #[test]
    fn test_cached_after_first_load() {
        let file = artifact_file(TWO_FEATURE_ARTIFACT);
        let store = ParameterStore::new(ModelSource::File(file.path().to_path_buf()), Some(2));
        assert!(store.loaded().is_none());

        let first = store.get().unwrap();
        let loaded_at = store.loaded().unwrap().loaded_at;

        // Source gone: the warm store must not re-read it
        file.close().unwrap();
        let second = store.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.loaded().unwrap().loaded_at, loaded_at);
    }

    #[test]
    fn test_concurrent_first_load() {
        let file = artifact_file(TWO_FEATURE_ARTIFACT);
        let store = Arc::new(ParameterStore::new(ModelSource::File(file.path().to_path_buf()), None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get().unwrap())
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for params in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], params));
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ParameterStore::new(ModelSource::File(dir.path().join("absent.json")), None);
        let err = store.get().unwrap_err();
        assert!(matches!(err, ConfigurationError::NotFound(_)));
        assert!(store.loaded().is_none());
    }

    #[test]
    fn test_invalid_artifact_is_not_cached() {
        let file = artifact_file(r#"{"coefficients": [1.0], "intercept": 0.0, "feature_names": ["a", "b"], "metadata": {}}"#);
        let store = ParameterStore::new(ModelSource::File(file.path().to_path_buf()), None);
        assert!(matches!(store.get(), Err(ConfigurationError::LengthMismatch { .. })));

        std::fs::write(file.path(), TWO_FEATURE_ARTIFACT).unwrap();
        assert_eq!(store.get().unwrap().feature_count(), 2);
    }

    #[test]
    fn test_dimension_enforced() {
        let store = ParameterStore::new(ModelSource::Embedded(TWO_FEATURE_ARTIFACT), Some(30));
        assert!(matches!(
            store.get(),
            Err(ConfigurationError::UnexpectedDimension { expected: 30, got: 2 })
        ));
    }
}
