// lambda_pipeline/src/contract/signature.rs

//! Structural descriptions of a step's parameters and return type.

use std::any::{Any, TypeId};
use std::fmt;

/// A concrete type, identified by `TypeId` and carrying its name for messages.
/// Two descriptors are equal exactly when their `TypeId`s are.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
  id: TypeId,
  name: &'static str,
}

impl TypeDescriptor {
  pub fn of<T: Any + ?Sized>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for TypeDescriptor {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

impl fmt::Display for TypeDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// One named parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
  pub name: &'static str,
  pub ty: TypeDescriptor,
}

impl Param {
  pub fn of<T: Any + ?Sized>(name: &'static str) -> Self {
    Self {
      name,
      ty: TypeDescriptor::of::<T>(),
    }
  }
}

/// The declared parameters and return type of a step.
///
/// Arguments are passed by name, so two signatures are equal when they declare the same
/// set of named parameters and the same return type, whatever the declaration order.
#[derive(Clone, Debug)]
pub struct Signature {
  params: Vec<Param>,
  output: TypeDescriptor,
}

impl Signature {
  pub fn new(params: Vec<Param>, output: TypeDescriptor) -> Self {
    Self { params, output }
  }

  /// Starts a signature by listing parameters one at a time.
  ///
  /// ```
  /// use lambda_pipeline::{Param, PipelineData, Signature};
  ///
  /// let sig = Signature::builder().param::<PipelineData>("data").returns::<PipelineData>();
  /// assert_eq!(sig.params(), &[Param::of::<PipelineData>("data")]);
  /// ```
  pub fn builder() -> SignatureBuilder {
    SignatureBuilder { params: Vec::new() }
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub fn param(&self, name: &str) -> Option<&Param> {
    self.params.iter().find(|p| p.name == name)
  }

  pub fn output(&self) -> TypeDescriptor {
    self.output
  }

  /// Human-readable discrepancies between `self` (expected) and `actual`. Empty when equal.
  pub fn mismatches(&self, actual: &Signature) -> Vec<String> {
    let mut found = Vec::new();

    for expected in &self.params {
      match actual.param(expected.name) {
        None => found.push(format!("missing parameter '{}'", expected.name)),
        Some(declared) if declared.ty != expected.ty => found.push(format!(
          "parameter '{}' declared as {}, expected {}",
          expected.name, declared.ty, expected.ty
        )),
        Some(_) => {}
      }
    }

    for (idx, declared) in actual.params.iter().enumerate() {
      if self.param(declared.name).is_none() {
        found.push(format!("unexpected parameter '{}'", declared.name));
      } else if actual.params[..idx].iter().any(|p| p.name == declared.name) {
        found.push(format!("parameter '{}' declared more than once", declared.name));
      }
    }

    if self.output != actual.output {
      found.push(format!(
        "return type declared as {}, expected {}",
        actual.output, self.output
      ));
    }

    found
  }
}

impl PartialEq for Signature {
  fn eq(&self, other: &Self) -> bool {
    self.output == other.output
      && self.params.len() == other.params.len()
      && self.params.iter().all(|p| other.param(p.name) == Some(p))
      && other.params.iter().all(|p| self.param(p.name) == Some(p))
  }
}

impl Eq for Signature {}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("(")?;
    for (idx, param) in self.params.iter().enumerate() {
      if idx > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}: {}", param.name, param.ty)?;
    }
    write!(f, ") -> {}", self.output)
  }
}

pub struct SignatureBuilder {
  params: Vec<Param>,
}

impl SignatureBuilder {
  pub fn param<T: Any + ?Sized>(mut self, name: &'static str) -> Self {
    self.params.push(Param::of::<T>(name));
    self
  }

  pub fn returns<T: Any + ?Sized>(self) -> Signature {
    Signature::new(self.params, TypeDescriptor::of::<T>())
  }
}
