// lambda_pipeline/src/contract/schema.rs

//! Per-step declarations of the payload fields a step reads.

use crate::core::payload::PipelineData;
use crate::core::value::{Value, ValueKind};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: String,
  pub kind: ValueKind,
  pub required: bool,
}

/// The payload fields a step expects, checked on every call before the step body runs.
///
/// Values of another kind are coerced where [`Value::coerce_to`] allows it (for example
/// `"10"` to `10` for an `Int` field); the step then receives a new payload holding the
/// coerced values. Lists and maps are never coerced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadSchema {
  fields: Vec<FieldSpec>,
}

/// Why a payload failed its schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaViolation {
  Missing { field: String, kind: ValueKind },
  WrongKind { field: String, expected: ValueKind, actual: Value },
}

impl fmt::Display for SchemaViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SchemaViolation::Missing { field, kind } => write!(f, "field '{}' ({}) is required", field, kind),
      SchemaViolation::WrongKind { field, expected, actual } => write!(
        f,
        "field '{}' expected {}, got {} {}",
        field,
        expected,
        actual.kind(),
        actual
      ),
    }
  }
}

impl PayloadSchema {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn require(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
    self.fields.push(FieldSpec {
      name: name.into(),
      kind,
      required: true,
    });
    self
  }

  /// Declares a field that may be absent (or null) but must have `kind` when present.
  pub fn optional(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
    self.fields.push(FieldSpec {
      name: name.into(),
      kind,
      required: false,
    });
    self
  }

  pub fn fields(&self) -> &[FieldSpec] {
    &self.fields
  }

  /// Checks `data` against the schema.
  ///
  /// Returns `Ok(None)` when the payload already conforms, `Ok(Some(coerced))` when
  /// one or more values had to be coerced, and the first violation otherwise.
  pub fn validate(&self, data: &PipelineData) -> Result<Option<PipelineData>, SchemaViolation> {
    let mut coerced: Vec<(String, Value)> = Vec::new();

    for spec in &self.fields {
      let value = match data.get(spec.name.as_str()) {
        Some(Value::Null) | None if !spec.required => continue,
        Some(value) => value,
        None => {
          return Err(SchemaViolation::Missing {
            field: spec.name.clone(),
            kind: spec.kind,
          })
        }
      };

      if value.kind() == spec.kind {
        continue;
      }
      match value.coerce_to(spec.kind) {
        Some(converted) => coerced.push((spec.name.clone(), converted)),
        None => {
          return Err(SchemaViolation::WrongKind {
            field: spec.name.clone(),
            expected: spec.kind,
            actual: value.clone(),
          })
        }
      }
    }

    if coerced.is_empty() {
      Ok(None)
    } else {
      Ok(Some(data.with_entries(coerced)))
    }
  }
}
