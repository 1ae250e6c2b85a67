// lambda_pipeline/src/core/payload.rs

//! Defines `PipelineData`, the payload threaded from one step to the next.

use crate::core::frozen::FrozenMap;
use crate::core::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

/// The payload passed between pipeline steps.
///
/// Semantically a `FrozenMap<String, Value>`, but a distinct type: the output validation
/// stage compares exact types, so a step declared to return `PipelineData` that hands
/// back a bare `FrozenMap` is rejected. Reads go through `Deref`; there is no way to
/// change a `PipelineData` after it is built. A step that wants to keep earlier fields
/// copies them into the payload it returns:
///
/// ```
/// use lambda_pipeline::{pipeline_data, PipelineData, Value};
///
/// let data = pipeline_data! { "first_step_result" => "Foo" };
/// let upper = data["first_step_result"].as_str().unwrap().to_uppercase();
/// let next = data.with_entries([("second_step_result", Value::from(upper))]);
///
/// assert_eq!(next.len(), 2);
/// assert_eq!(data.len(), 1);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct PipelineData(FrozenMap<String, Value>);

impl PipelineData {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a new payload from this one's entries followed by `entries`; later entries win.
  pub fn with_entries<K, V, I>(&self, entries: I) -> Self
  where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
  {
    PipelineData(
      self
        .0
        .with_entries(entries.into_iter().map(|(k, v)| (k.into(), v.into()))),
    )
  }

  /// Builds a new payload with the listed keys left out.
  pub fn without<'k, I>(&self, keys: I) -> Self
  where
    I: IntoIterator<Item = &'k str>,
  {
    let mut entries = self.0.snapshot();
    for key in keys {
      entries.shift_remove(key);
    }
    PipelineData(FrozenMap::from(entries))
  }

  /// A plain, mutable copy of the entries.
  pub fn snapshot(&self) -> IndexMap<String, Value> {
    self.0.snapshot()
  }

  pub fn as_frozen_map(&self) -> &FrozenMap<String, Value> {
    &self.0
  }

  pub fn into_frozen_map(self) -> FrozenMap<String, Value> {
    self.0
  }
}

impl Deref for PipelineData {
  type Target = FrozenMap<String, Value>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl fmt::Debug for PipelineData {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("PipelineData").field(&self.0).finish()
  }
}

impl From<FrozenMap<String, Value>> for PipelineData {
  fn from(map: FrozenMap<String, Value>) -> Self {
    PipelineData(map)
  }
}

impl From<IndexMap<String, Value>> for PipelineData {
  fn from(entries: IndexMap<String, Value>) -> Self {
    PipelineData(FrozenMap::from(entries))
  }
}

impl From<HashMap<String, Value>> for PipelineData {
  fn from(entries: HashMap<String, Value>) -> Self {
    PipelineData(FrozenMap::from(entries))
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PipelineData {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    PipelineData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl From<PipelineData> for Value {
  fn from(data: PipelineData) -> Self {
    Value::Map(data.0)
  }
}

/// Builds a `PipelineData` from `key => value` pairs. Values go through `Into<Value>`.
///
/// ```
/// use lambda_pipeline::pipeline_data;
///
/// let data = pipeline_data! { "input_data" => "foo", "attempt" => 1 };
/// assert_eq!(data["input_data"].as_str(), Some("foo"));
/// assert_eq!(pipeline_data! {}.len(), 0);
/// ```
#[macro_export]
macro_rules! pipeline_data {
  () => {
    $crate::PipelineData::new()
  };
  ($($key:expr => $value:expr),+ $(,)?) => {
    <$crate::PipelineData as ::std::iter::FromIterator<(::std::string::String, $crate::Value)>>::from_iter([
      $((::std::string::String::from($key), $crate::Value::from($value))),+
    ])
  };
}
