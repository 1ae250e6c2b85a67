// lambda_pipeline/src/core/value.rs

//! Dynamic values carried inside a `PipelineData` payload.

use crate::core::frozen::FrozenMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A payload value. Nested maps are `FrozenMap`s, so a payload is immutable all the way down.
#[derive(Clone, Debug)]
pub enum Value {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Value>),
  Map(FrozenMap<String, Value>),
}

/// The shape of a `Value`, used by payload schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
  Null,
  Bool,
  Int,
  Float,
  Str,
  List,
  Map,
}

impl ValueKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ValueKind::Null => "null",
      ValueKind::Bool => "bool",
      ValueKind::Int => "int",
      ValueKind::Float => "float",
      ValueKind::Str => "str",
      ValueKind::List => "list",
      ValueKind::Map => "map",
    }
  }

  /// Structured kinds are never produced by coercion.
  pub fn is_structured(&self) -> bool {
    matches!(self, ValueKind::List | ValueKind::Map)
  }
}

impl fmt::Display for ValueKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Value {
  pub fn kind(&self) -> ValueKind {
    match self {
      Value::Null => ValueKind::Null,
      Value::Bool(_) => ValueKind::Bool,
      Value::Int(_) => ValueKind::Int,
      Value::Float(_) => ValueKind::Float,
      Value::Str(_) => ValueKind::Str,
      Value::List(_) => ValueKind::List,
      Value::Map(_) => ValueKind::Map,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Str(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_float(&self) -> Option<f64> {
    match self {
      Value::Float(f) => Some(*f),
      Value::Int(i) => Some(*i as f64),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Value::List(items) => Some(items),
      _ => None,
    }
  }

  pub fn as_map(&self) -> Option<&FrozenMap<String, Value>> {
    match self {
      Value::Map(map) => Some(map),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }

  /// Converts this value to `kind` where that is lossless and unambiguous.
  ///
  /// Returns the value unchanged when it already has the requested kind, a converted value
  /// for the scalar conversions below, and `None` otherwise:
  /// - numeric strings to `Int` or `Float` (surrounding whitespace ignored),
  /// - `Int` to `Float`, and integral `Float`s to `Int`,
  /// - `"true"`/`"false"` to `Bool`.
  ///
  /// Lists and maps are never built from, or turned into, anything else.
  pub fn coerce_to(&self, kind: ValueKind) -> Option<Value> {
    if self.kind() == kind {
      return Some(self.clone());
    }
    match (self, kind) {
      (Value::Str(s), ValueKind::Int) => s.trim().parse::<i64>().ok().map(Value::Int),
      (Value::Str(s), ValueKind::Float) => s
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Value::Float),
      (Value::Str(s), ValueKind::Bool) => match s.trim() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
      },
      (Value::Int(i), ValueKind::Float) if i.unsigned_abs() <= MAX_EXACT_FLOAT_INT => Some(Value::Float(*i as f64)),
      (Value::Float(f), ValueKind::Int) if f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(f) => {
        Some(Value::Int(*f as i64))
      }
      _ => None,
    }
  }
}

// Largest magnitude below which every integer has an exact f64.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;
// `i64::MIN` is exact as an f64; `i64::MAX` rounds up to 2^63, which is out of range.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

// Floats compare by bit pattern so that `Eq` and `Hash` agree.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => a == b,
      (Value::Map(a), Value::Map(b)) => a == b,
      _ => false,
    }
  }
}

impl Eq for Value {}

impl Hash for Value {
  fn hash<H: Hasher>(&self, state: &mut H) {
    std::mem::discriminant(self).hash(state);
    match self {
      Value::Null => {}
      Value::Bool(b) => b.hash(state),
      Value::Int(i) => i.hash(state),
      Value::Float(f) => f.to_bits().hash(state),
      Value::Str(s) => s.hash(state),
      Value::List(items) => items.hash(state),
      Value::Map(map) => map.hash(state),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => f.write_str("null"),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Int(i) => write!(f, "{}", i),
      Value::Float(x) => write!(f, "{}", x),
      Value::Str(s) => write!(f, "{:?}", s),
      Value::List(items) => {
        f.write_str("[")?;
        for (idx, item) in items.iter().enumerate() {
          if idx > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}", item)?;
        }
        f.write_str("]")
      }
      Value::Map(map) => {
        f.write_str("{")?;
        for (idx, (key, item)) in map.iter().enumerate() {
          if idx > 0 {
            f.write_str(", ")?;
          }
          write!(f, "{:?}: {}", key, item)?;
        }
        f.write_str("}")
      }
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Int(i)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i64::from(i))
  }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self {
    Value::Float(f)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<Vec<Value>> for Value {
  fn from(items: Vec<Value>) -> Self {
    Value::List(items)
  }
}

impl From<FrozenMap<String, Value>> for Value {
  fn from(map: FrozenMap<String, Value>) -> Self {
    Value::Map(map)
  }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(opt: Option<T>) -> Self {
    opt.map_or(Value::Null, Into::into)
  }
}
