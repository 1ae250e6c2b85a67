// lambda_pipeline/src/core/erased.rs

//! Type-erased values moved through the call-time stages: the arguments a step is
//! invoked with and the value it returns.
//!
//! Stages inspect these by `TypeId` only; typed steps downcast back to concrete types
//! once all checks have passed.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased value that remembers the name of its concrete type.
#[derive(Clone)]
pub struct Erased {
  value: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Erased {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      value,
      type_name: std::any::type_name::<T>(),
    }
  }

  /// The `TypeId` of the concrete value (not of the `Arc` holding it).
  pub fn type_id(&self) -> TypeId {
    let value: &dyn Any = &*self.value;
    value.type_id()
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is<T: Any>(&self) -> bool {
    self.value.is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.value.downcast_ref::<T>()
  }

  /// Recovers the concrete value, cloning only if other handles to it are still alive.
  pub fn downcast<T: Any + Send + Sync + Clone>(self) -> Result<T, Erased> {
    let type_name = self.type_name;
    match self.value.downcast::<T>() {
      Ok(arc) => Ok(Arc::unwrap_or_clone(arc)),
      Err(value) => Err(Erased { value, type_name }),
    }
  }

  /// Recovers the shared `Arc` without cloning the value.
  pub fn downcast_arc<T: Any + Send + Sync>(self) -> Result<Arc<T>, Erased> {
    let type_name = self.type_name;
    self
      .value
      .downcast::<T>()
      .map_err(|value| Erased { value, type_name })
  }
}

impl fmt::Debug for Erased {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Erased").field("type", &self.type_name).finish()
  }
}

/// The named arguments of one step invocation, in call order.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
  entries: Vec<(&'static str, Erased)>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds an argument, replacing any previous value of the same name.
  pub fn with(mut self, name: &'static str, value: Erased) -> Self {
    self.set(name, value);
    self
  }

  pub fn get(&self, name: &str) -> Option<&Erased> {
    self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
  }

  /// Replaces the value of `name`, or appends it if absent.
  pub fn set(&mut self, name: &'static str, value: Erased) {
    match self.entries.iter_mut().find(|(n, _)| *n == name) {
      Some(slot) => slot.1 = value,
      None => self.entries.push((name, value)),
    }
  }

  pub fn take(&mut self, name: &str) -> Option<Erased> {
    let idx = self.entries.iter().position(|(n, _)| *n == name)?;
    Some(self.entries.remove(idx).1)
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.entries.iter().map(|(n, _)| *n)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn type_id_is_the_concrete_type() {
    let erased = Erased::new(5u32);
    assert_eq!(erased.type_id(), TypeId::of::<u32>());
    assert_eq!(erased.type_name(), "u32");
    assert!(erased.is::<u32>());
    assert!(!erased.is::<u64>());
  }

  #[test]
  fn downcast_round_trip() {
    let erased = Erased::new(String::from("foo"));
    let still_erased = erased.downcast::<i32>().unwrap_err();
    assert_eq!(still_erased.downcast::<String>().unwrap(), "foo");
  }

  #[test]
  fn arguments_replace_by_name() {
    let mut args = Arguments::new()
      .with("data", Erased::new(1u8))
      .with("context", Erased::new(2u8));
    args.set("data", Erased::new(3u8));
    assert_eq!(args.len(), 2);
    assert_eq!(args.names().collect::<Vec<_>>(), vec!["data", "context"]);
    assert_eq!(args.get("data").and_then(|v| v.downcast_ref::<u8>()), Some(&3));
    assert!(args.take("context").is_some());
    assert!(args.get("context").is_none());
  }
}
