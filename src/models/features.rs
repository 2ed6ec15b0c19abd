//! Feature resolution - request payload to canonical feature vector
//!
//! Callers may send features either positionally or by name:
//!
//! ```json
//! {"features": [17.99, 10.38, ...]}
//! {"features": {"mean radius": 17.99, "mean texture": 10.38, ...}}
//! ```
//!
//! Both shapes are turned into a [`FeaturePayload`] once, at the boundary,
//! and then into a [`FeatureVector`] in the model's training order.

use serde_json::{Map, Value};

use crate::error::{FeatureRef, ValidationError};

/// Raw `features` value, by shape
#[derive(Debug, Clone, PartialEq)]
pub enum FeaturePayload {
    /// Values already in training order
    Ordered(Vec<Value>),
    /// Values keyed by feature name
    Named(Map<String, Value>),
}

impl FeaturePayload {
    /// Parse a raw request body
    pub fn from_body(body: &[u8]) -> Result<Self, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MissingBody);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;

        Self::from_value(value)
    }

    /// Pick the `features` field out of a decoded body
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(mut body) = value else {
            return Err(ValidationError::MalformedFeatures);
        };

        match body.remove("features") {
            Some(Value::Array(values)) => Ok(Self::Ordered(values)),
            Some(Value::Object(values)) => Ok(Self::Named(values)),
            _ => Err(ValidationError::MalformedFeatures),
        }
    }

    /// Project onto `expected_names`.
    ///
    /// Ordered input must match the length exactly. Named input must cover
    /// every expected name; extra keys are ignored.
    pub fn resolve(&self, expected_names: &[String]) -> Result<FeatureVector, ValidationError> {
        let values = match self {
            FeaturePayload::Ordered(values) => {
                if values.len() != expected_names.len() {
                    return Err(ValidationError::CountMismatch {
                        expected: expected_names.len(),
                        got: values.len(),
                    });
                }

                values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| finite_number(v).ok_or(ValidationError::NonNumeric(FeatureRef::Position(i))))
                    .collect::<Result<Vec<_>, _>>()?
            }
            FeaturePayload::Named(values) => {
                let missing: Vec<String> = expected_names
                    .iter()
                    .filter(|name| !values.contains_key(name.as_str()))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(ValidationError::MissingFeatures(missing));
                }

                expected_names
                    .iter()
                    .map(|name| {
                        values
                            .get(name.as_str())
                            .and_then(finite_number)
                            .ok_or_else(|| ValidationError::NonNumeric(FeatureRef::Name(name.clone())))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(FeatureVector(values))
    }
}

/// JSON numbers only. Numeric strings are not coerced.
fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Feature values in the model's training order, all finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub(crate) fn from_raw(values: Vec<f64>) -> Self {
        Self(values)
    }
}
