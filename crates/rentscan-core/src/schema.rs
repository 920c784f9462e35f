//! Validation contract shared by every document response record.
//!
//! Records are built in two steps: serde fills the struct (defaults cover
//! anything the model left out), then [`ResponseSchema::check`] enforces
//! value constraints serde cannot express, such as confidence ranges.

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::DocumentKind;

/// A field that parsed but holds a value outside its allowed range.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Path to the field, e.g. `damages[0].confidence`.
    pub field: String,
    pub reason: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    /// Wrong JSON type, missing required field, or unknown enum value.
    #[error("{document} response has the wrong shape: {source}")]
    Shape {
        document: DocumentKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{document} response failed validation: {}", join(.violations))]
    Constraint {
        document: DocumentKind,
        violations: Vec<Violation>,
    },
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaError {
    pub fn document(&self) -> DocumentKind {
        match self {
            Self::Shape { document, .. } | Self::Constraint { document, .. } => *document,
        }
    }

    /// Paths of the offending fields, where they are known.
    ///
    /// Shape errors come from serde, which names a missing field but not the
    /// path of a mistyped one; only the former is reported.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Self::Constraint { violations, .. } => {
                violations.iter().map(|v| v.field.clone()).collect()
            }
            Self::Shape { source, .. } => missing_field(&source.to_string())
                .map(|f| vec![f.to_string()])
                .unwrap_or_default(),
        }
    }
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Collects constraint violations while walking a record.
#[derive(Debug, Default)]
pub struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `value` to lie in [0.0, 1.0]. NaN is rejected.
    pub fn confidence(&mut self, field: impl Into<String>, value: f64) {
        self.range(field, value, 0.0, 1.0);
    }

    /// Require `min <= value <= max`. NaN is rejected.
    pub fn range(&mut self, field: impl Into<String>, value: f64, min: f64, max: f64) {
        if !(min..=max).contains(&value) {
            self.fail(field, format!("{value} is outside [{min}, {max}]"));
        }
    }

    /// Require a value that cannot be negative, e.g. a repair cost.
    pub fn non_negative(&mut self, field: impl Into<String>, value: f64) {
        if value.is_nan() || value < 0.0 {
            self.fail(field, format!("{value} must not be negative"));
        }
    }

    pub fn fail(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(Violation {
            field: field.into(),
            reason: reason.into(),
        });
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn finish(self, document: DocumentKind) -> Result<(), SchemaError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Constraint {
                document,
                violations: self.violations,
            })
        }
    }
}

/// A validated record returned by one document class.
pub trait ResponseSchema: DeserializeOwned + Serialize + Send + Sized + 'static {
    /// The document class whose prompts produce this record.
    const KIND: DocumentKind;

    /// Report every value constraint this record breaks.
    fn check(&self, checker: &mut Checker);

    /// Re-run the value constraints on an already built record.
    fn validate(&self) -> Result<(), SchemaError> {
        let mut checker = Checker::new();
        self.check(&mut checker);
        checker.finish(Self::KIND)
    }

    /// Build a record from one JSON object, filling defaults and then
    /// enforcing value constraints.
    fn from_json(object: Map<String, Value>) -> Result<Self, SchemaError> {
        let record: Self =
            serde_json::from_value(Value::Object(object)).map_err(|source| {
                debug!(document = %Self::KIND, error = %source, "response shape rejected");
                SchemaError::Shape {
                    document: Self::KIND,
                    source,
                }
            })?;
        record.validate()?;
        Ok(record)
    }

    /// Parse a record from JSON text. Convenience for tests and tooling.
    fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let object = serde_json::from_str::<Map<String, Value>>(json).map_err(|source| {
            SchemaError::Shape {
                document: Self::KIND,
                source,
            }
        })?;
        Self::from_json(object)
    }
}
