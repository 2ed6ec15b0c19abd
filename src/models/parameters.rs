//! Model parameters - trained logistic regression weights
//!
//! The artifact is produced offline by the training job. Two layouts are
//! accepted for the weights:
//!
//! ```json
//! { "coefficients": [0.1, 0.2], "intercept": 0.5, ... }
//! { "coefficients": [[0.1, 0.2]], "intercept": [0.5], ... }
//! ```
//!
//! The second is what scikit-learn's `coef_` / `intercept_` serialize to.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigurationError;

/// Class labels used when the artifact does not list them
pub const DEFAULT_CLASSES: [i64; 2] = [0, 1];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoefficientsField {
    Flat(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InterceptField {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// On-disk artifact layout
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    coefficients: CoefficientsField,
    intercept: InterceptField,
    feature_names: Vec<String>,
    metadata: BTreeMap<String, Value>,
    #[serde(default)]
    classes: Option<Vec<i64>>,
}

/// Validated, immutable model parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    coefficients: Vec<f64>,
    intercept: f64,
    feature_names: Vec<String>,
    classes: [i64; 2],
    metadata: BTreeMap<String, String>,
}

impl ModelParameters {
    /// Parse and validate a JSON artifact.
    ///
    /// `expected_features` pins the dimensionality; pass `None` to accept
    /// whatever the artifact declares.
    pub fn from_json(raw: &str, expected_features: Option<usize>) -> Result<Self, ConfigurationError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;

        let coefficients = match artifact.coefficients {
            CoefficientsField::Flat(values) => values,
            CoefficientsField::Rows(mut rows) => {
                if rows.len() != 1 {
                    return Err(ConfigurationError::MultiClass(rows.len()));
                }
                rows.remove(0)
            }
        };

        let intercept = match artifact.intercept {
            InterceptField::Scalar(value) => value,
            InterceptField::Vector(values) => match values.as_slice() {
                [value] => *value,
                _ => return Err(ConfigurationError::InterceptArity(values.len())),
            },
        };

        let metadata = artifact
            .metadata
            .into_iter()
            .map(|(key, value)| (key, metadata_string(value)))
            .collect();

        let params = Self::build(
            coefficients,
            intercept,
            artifact.feature_names,
            artifact.classes,
            metadata,
        )?;

        if let Some(expected) = expected_features {
            if params.feature_count() != expected {
                return Err(ConfigurationError::UnexpectedDimension {
                    expected,
                    got: params.feature_count(),
                });
            }
        }

        Ok(params)
    }

    fn build(
        coefficients: Vec<f64>,
        intercept: f64,
        feature_names: Vec<String>,
        classes: Option<Vec<i64>>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self, ConfigurationError> {
        if coefficients.len() != feature_names.len() {
            return Err(ConfigurationError::LengthMismatch {
                coefficients: coefficients.len(),
                feature_names: feature_names.len(),
            });
        }
        if feature_names.is_empty() {
            return Err(ConfigurationError::Empty);
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ConfigurationError::NonFinite);
        }

        let mut seen = HashSet::with_capacity(feature_names.len());
        if let Some(dup) = feature_names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(ConfigurationError::DuplicateFeature(dup.clone()));
        }

        let classes = match classes {
            None => DEFAULT_CLASSES,
            Some(labels) => match labels.as_slice() {
                [negative, positive] => [*negative, *positive],
                _ => return Err(ConfigurationError::ClassCount(labels.len())),
            },
        };

        Ok(Self {
            coefficients,
            intercept,
            feature_names,
            classes,
            metadata,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Label emitted for `positive == false` / `positive == true`
    pub fn class_label(&self, positive: bool) -> i64 {
        self.classes[usize::from(positive)]
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Metadata is echoed as strings; non-string values keep their JSON text.
fn metadata_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TWO_FEATURE_ARTIFACT: &str = r#"{
        "coefficients": [1.0, 2.0],
        "intercept": 0.0,
        "feature_names": ["a", "b"],
        "metadata": {"accuracy": "0.9500", "roc_auc": "0.9900"}
    }"#;

    pub(crate) fn two_feature_model() -> ModelParameters {
        ModelParameters::from_json(TWO_FEATURE_ARTIFACT, Some(2)).expect("valid artifact")
    }

    #[test]
    fn test_flat_artifact() {
        let params = two_feature_model();
        assert_eq!(params.coefficients(), &[1.0, 2.0]);
        assert_eq!(params.intercept(), 0.0);
        assert_eq!(params.feature_names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(params.class_label(false), 0);
        assert_eq!(params.class_label(true), 1);
        assert_eq!(params.metadata()["accuracy"], "0.9500");
    }

    #[test]
    fn test_matrix_artifact_matches_flat() {
        let raw = r#"{
            "coefficients": [[1.0, 2.0]],
            "intercept": [0.0],
            "classes": [0, 1],
            "feature_names": ["a", "b"],
            "metadata": {"accuracy": "0.9500", "roc_auc": "0.9900"}
        }"#;
        let params = ModelParameters::from_json(raw, None).unwrap();
        assert_eq!(params, two_feature_model());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let raw = r#"{
            "coefficients": [1.0],
            "intercept": 0.0,
            "feature_names": ["a", "b"],
            "metadata": {}
        }"#;
        let err = ModelParameters::from_json(raw, None).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::LengthMismatch { coefficients: 1, feature_names: 2 }
        ));
    }

    #[test]
    fn test_29_coefficients_for_30_names_rejected() {
        let names: Vec<String> = (0..30).map(|i| format!("f{i}")).collect();
        let err = ModelParameters::build(vec![0.1; 29], 0.0, names, None, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::LengthMismatch { .. }));
    }

    #[test]
    fn test_unexpected_dimension_rejected() {
        let err = ModelParameters::from_json(TWO_FEATURE_ARTIFACT, Some(30)).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::UnexpectedDimension { expected: 30, got: 2 }
        ));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let raw = r#"{"coefficients": [1.0], "intercept": 0.0, "feature_names": ["a"]}"#;
        let err = ModelParameters::from_json(raw, None).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));

        let err = ModelParameters::from_json("not json", None).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }

    #[test]
    fn test_multiclass_rows_rejected() {
        let raw = r#"{
            "coefficients": [[1.0], [2.0], [3.0]],
            "intercept": [0.0, 0.0, 0.0],
            "feature_names": ["a"],
            "metadata": {}
        }"#;
        let err = ModelParameters::from_json(raw, None).unwrap_err();
        assert!(matches!(err, ConfigurationError::MultiClass(3)));
    }

    #[test]
    fn test_intercept_arity_rejected() {
        let raw = r#"{
            "coefficients": [[1.0]],
            "intercept": [0.0, 1.0],
            "feature_names": ["a"],
            "metadata": {}
        }"#;
        let err = ModelParameters::from_json(raw, None).unwrap_err();
        assert!(matches!(err, ConfigurationError::InterceptArity(2)));
    }

    #[test]
    fn test_empty_and_duplicate_features_rejected() {
        let err = ModelParameters::build(vec![], 0.0, vec![], None, BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigurationError::Empty));

        let err = ModelParameters::build(
            vec![1.0, 1.0],
            0.0,
            vec!["a".to_string(), "a".to_string()],
            None,
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateFeature(name) if name == "a"));
    }

    #[test]
    fn test_class_labels() {
        let raw = r#"{
            "coefficients": [1.0],
            "intercept": 0.0,
            "classes": [2, 4],
            "feature_names": ["a"],
            "metadata": {}
        }"#;
        let params = ModelParameters::from_json(raw, None).unwrap();
        assert_eq!(params.class_label(false), 2);
        assert_eq!(params.class_label(true), 4);

        let raw = raw.replace("[2, 4]", "[0, 1, 2]");
        let err = ModelParameters::from_json(&raw, None).unwrap_err();
        assert!(matches!(err, ConfigurationError::ClassCount(3)));
    }

    #[test]
    fn test_metadata_values_become_strings() {
        let raw = r#"{
            "coefficients": [1.0],
            "intercept": 0.0,
            "feature_names": ["a"],
            "metadata": {"accuracy": 0.95, "calibrated": false, "target_names": "malignant, benign"}
        }"#;
        let params = ModelParameters::from_json(raw, None).unwrap();
        assert_eq!(params.metadata()["accuracy"], "0.95");
        assert_eq!(params.metadata()["calibrated"], "false");
        assert_eq!(params.metadata()["target_names"], "malignant, benign");
    }
}
