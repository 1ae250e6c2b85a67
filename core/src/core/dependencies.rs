// lambda_pipeline/src/core/dependencies.rs

//! Shared, read-only services handed to every step (database clients, configuration, ...).

use crate::core::frozen::FrozenMap;
use crate::error::PipelineError;
use indexmap::IndexMap;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased, shared handle to one dependency.
///
/// Two handles are equal when they point at the same allocation; hashing follows suit.
#[derive(Clone)]
pub struct Dependency {
  inner: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Dependency {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Shares an existing `Arc` instead of allocating a new one.
  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      inner: value,
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub fn is<T: Any>(&self) -> bool {
    self.inner.is::<T>()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.inner.downcast_ref::<T>()
  }

  /// A new strong reference to the dependency, if it has type `T`.
  pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    Arc::clone(&self.inner).downcast::<T>().ok()
  }

  fn addr(&self) -> *const () {
    Arc::as_ptr(&self.inner) as *const ()
  }
}

impl PartialEq for Dependency {
  fn eq(&self, other: &Self) -> bool {
    self.addr() == other.addr()
  }
}

impl Eq for Dependency {}

impl Hash for Dependency {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.addr().hash(state);
  }
}

impl fmt::Debug for Dependency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dependency").field("type", &self.type_name).finish()
  }
}

/// The frozen dependency bag shared by every step of a pipeline.
pub type Dependencies = FrozenMap<String, Dependency>;

impl FrozenMap<String, Dependency> {
  /// Typed lookup. An absent key is `MissingKey`; a present key of another type is `DependencyType`.
  pub fn get_as<T: Any>(&self, key: &str) -> Result<&T, PipelineError> {
    let dependency = self.try_get(key)?;
    dependency.downcast_ref::<T>().ok_or_else(|| PipelineError::DependencyType {
      key: key.to_string(),
      expected: std::any::type_name::<T>().to_string(),
    })
  }
}

/// Anything the pipeline builder accepts as a dependency bag. Already-frozen bags are used as is.
pub trait IntoDependencies {
  fn into_dependencies(self) -> Dependencies;
}

impl IntoDependencies for Dependencies {
  fn into_dependencies(self) -> Dependencies {
    self
  }
}

impl IntoDependencies for &Dependencies {
  fn into_dependencies(self) -> Dependencies {
    self.clone()
  }
}

impl IntoDependencies for HashMap<String, Dependency> {
  fn into_dependencies(self) -> Dependencies {
    Dependencies::from(self)
  }
}

impl IntoDependencies for IndexMap<String, Dependency> {
  fn into_dependencies(self) -> Dependencies {
    Dependencies::from(self)
  }
}

impl<const N: usize> IntoDependencies for [(&str, Dependency); N] {
  fn into_dependencies(self) -> Dependencies {
    self.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
  }
}

impl IntoDependencies for () {
  fn into_dependencies(self) -> Dependencies {
    Dependencies::new()
  }
}
