use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name of the built-in duration field.
pub const DURATION: &str = "duration";
/// Name of the built-in coverage field.
pub const COVERAGE: &str = "coverage";

#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("expected a number or a mapping of numbers, found {found}")]
    NotNumeric { found: &'static str },
}

/// A metric value: either a scalar or a mapping of numeric sub-metrics
/// (lines, branches, missing lines, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Mapping(BTreeMap<String, f64>),
}

/// Shape of a [`MetricValue`], used to reject mixed shapes under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Mapping,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Mapping => write!(f, "mapping"),
        }
    }
}

impl MetricValue {
    pub fn shape(&self) -> Shape {
        match self {
            MetricValue::Scalar(_) => Shape::Scalar,
            MetricValue::Mapping(_) => Shape::Mapping,
        }
    }

    /// Comparison scalar: the value itself, or the sum of the mapping's values.
    pub fn scalar(&self) -> f64 {
        match self {
            MetricValue::Scalar(v) => *v,
            MetricValue::Mapping(m) => m.values().sum(),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Scalar(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<&Value> for MetricValue {
    type Error = MetricsError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(MetricValue::Scalar)
                .ok_or(MetricsError::NotNumeric { found: "number" }),
            Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (k, v) in map {
                    let v = v.as_f64().ok_or(MetricsError::NotNumeric {
                        found: "object with non-numeric values",
                    })?;
                    out.insert(k.clone(), v);
                }
                Ok(MetricValue::Mapping(out))
            }
            other => Err(MetricsError::NotNumeric {
                found: json_kind(other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
    Error,
    /// Anything else the runner reports (`xfailed`, `xpassed`, `unknown`).
    #[serde(other)]
    Unknown,
}

/// Per-test metrics as collected by the test runner. Unknown fields are kept
/// verbatim so they can be written back and used as ranking keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub duration: f64,
    pub coverage: MetricValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>, duration: f64, coverage: impl Into<MetricValue>) -> Self {
        Self {
            name: name.into(),
            duration,
            coverage: coverage.into(),
            outcome: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_passed(&self) -> bool {
        matches!(self.outcome, None | Some(Outcome::Passed))
    }

    /// Looks up `key` as a metric value.
    ///
    /// Returns `None` when the record has no such field, and an error when the
    /// field exists but is not numeric (`name`, `outcome`, strings, ...).
    pub fn field(&self, key: &str) -> Option<Result<MetricValue, MetricsError>> {
        match key {
            DURATION => Some(Ok(MetricValue::Scalar(self.duration))),
            COVERAGE => Some(Ok(self.coverage.clone())),
            "name" => Some(Err(MetricsError::NotNumeric { found: "string" })),
            "outcome" => self
                .outcome
                .map(|_| Err(MetricsError::NotNumeric { found: "string" })),
            _ => self.extra.get(key).map(MetricValue::try_from),
        }
    }
}
