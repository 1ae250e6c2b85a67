// lambda_pipeline/src/core/step.rs

//! Defines the `Step` trait every pipeline step implements, and `FnStep`, which adapts a
//! plain typed function into a `Step`.

use crate::contract::{PayloadSchema, Signature, CONTEXT, DATA, DEPENDENCIES, EVENT, LOGGER};
use crate::core::dependencies::Dependencies;
use crate::core::erased::{Arguments, Erased};
use crate::core::payload::PipelineData;
use crate::error::PipelineError;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::Span;

/// A single pipeline step.
///
/// Steps are type-erased so that a pipeline can be assembled from a list resolved at
/// runtime (see `StepRegistry`). What a step accepts is described by its `signature`,
/// which is checked against the pipeline's contract once, when the pipeline is built.
///
/// `Err` is the error type the step's own logic returns. The pipeline converts its own
/// failures into it, so it must implement `From<PipelineError>` wherever a pipeline is built.
pub trait Step<Err>: Send + Sync {
  fn name(&self) -> &str;

  /// The parameters and return type this step declares.
  fn signature(&self) -> &Signature;

  /// Payload fields this step requires, validated (and coerced) before every call.
  fn payload_schema(&self) -> Option<&PayloadSchema> {
    None
  }

  /// Runs the step body. `args` holds one value per declared parameter, by name.
  fn call(&self, args: Arguments) -> Result<Erased, Err>;
}

/// What a typed step function receives.
///
/// The event and dependency bag are shared and read-only. The context is this call's own
/// copy: changes to it are discarded when the step returns.
///
/// ```compile_fail
/// use lambda_pipeline::{PipelineData, PipelineError, StepInput};
///
/// struct Event { body: String }
///
/// fn tamper(input: StepInput<'_, Event, ()>) -> Result<PipelineData, PipelineError> {
///   input.event.body = "foo".to_string();
///   Ok(input.data)
/// }
/// ```
pub struct StepInput<'a, E, C> {
  pub data: PipelineData,
  pub event: &'a E,
  pub context: &'a mut C,
  pub dependencies: &'a Dependencies,
  pub logger: &'a Span,
}

/// A `Step` backed by a function `Fn(StepInput<'_, E, C>) -> Result<R, Err>`.
///
/// The declared signature is derived from `E`, `C` and `R`, so a function written for a
/// different event type, or returning something other than `PipelineData`, is refused
/// when the pipeline is built.
pub struct FnStep<E, C, R, Err, F> {
  name: String,
  signature: Signature,
  schema: Option<PayloadSchema>,
  func: F,
  _marker: PhantomData<fn(&E, &mut C) -> Result<R, Err>>,
}

/// Wraps `func` as a step called `name`.
///
/// ```
/// use lambda_pipeline::{step_fn, PipelineData, PipelineError, Step, StepInput};
///
/// struct Event;
///
/// fn passthrough(input: StepInput<'_, Event, ()>) -> Result<PipelineData, PipelineError> {
///   Ok(input.data)
/// }
///
/// let step = step_fn("passthrough", passthrough);
/// assert_eq!(Step::<PipelineError>::name(&step), "passthrough");
/// ```
pub fn step_fn<E, C, R, Err, F>(name: impl Into<String>, func: F) -> FnStep<E, C, R, Err, F>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  R: Any + Send + Sync,
  F: Fn(StepInput<'_, E, C>) -> Result<R, Err> + Send + Sync + 'static,
{
  let signature = Signature::builder()
    .param::<PipelineData>(DATA)
    .param::<E>(EVENT)
    .param::<C>(CONTEXT)
    .param::<Dependencies>(DEPENDENCIES)
    .param::<Span>(LOGGER)
    .returns::<R>();

  FnStep {
    name: name.into(),
    signature,
    schema: None,
    func,
    _marker: PhantomData,
  }
}

impl<E, C, R, Err, F> FnStep<E, C, R, Err, F> {
  /// Declares the payload fields this step reads.
  pub fn with_schema(mut self, schema: PayloadSchema) -> Self {
    self.schema = Some(schema);
    self
  }
}

impl<E, C, R, Err, F> fmt::Debug for FnStep<E, C, R, Err, F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FnStep")
      .field("name", &self.name)
      .field("signature", &self.signature)
      .field("schema", &self.schema)
      .finish()
  }
}

fn take_arg(args: &mut Arguments, step: &str, param: &'static str) -> Result<Erased, PipelineError> {
  args
    .take(param)
    .ok_or_else(|| PipelineError::validation(step, param, "missing argument"))
}

fn mismatch<T>(step: &str, param: &str, actual: &Erased) -> PipelineError {
  PipelineError::validation(
    step,
    param,
    format!("expected type {}, got {}", std::any::type_name::<T>(), actual.type_name()),
  )
}

fn take_shared<T: Any + Send + Sync>(args: &mut Arguments, step: &str, param: &'static str) -> Result<Arc<T>, PipelineError> {
  take_arg(args, step, param)?
    .downcast_arc::<T>()
    .map_err(|actual| mismatch::<T>(step, param, &actual))
}

fn take_owned<T: Any + Send + Sync + Clone>(
  args: &mut Arguments,
  step: &str,
  param: &'static str,
) -> Result<T, PipelineError> {
  take_arg(args, step, param)?
    .downcast::<T>()
    .map_err(|actual| mismatch::<T>(step, param, &actual))
}

impl<E, C, R, Err, F> Step<Err> for FnStep<E, C, R, Err, F>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  R: Any + Send + Sync,
  Err: From<PipelineError>,
  F: Fn(StepInput<'_, E, C>) -> Result<R, Err> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    &self.name
  }

  fn signature(&self) -> &Signature {
    &self.signature
  }

  fn payload_schema(&self) -> Option<&PayloadSchema> {
    self.schema.as_ref()
  }

  fn call(&self, mut args: Arguments) -> Result<Erased, Err> {
    let step = self.name.as_str();
    let data = take_owned::<PipelineData>(&mut args, step, DATA)?;
    let event = take_shared::<E>(&mut args, step, EVENT)?;
    let mut context = take_owned::<C>(&mut args, step, CONTEXT)?;
    let dependencies = take_shared::<Dependencies>(&mut args, step, DEPENDENCIES)?;
    let logger = take_shared::<Span>(&mut args, step, LOGGER)?;

    let input = StepInput {
      data,
      event: &*event,
      context: &mut context,
      dependencies: &dependencies,
      logger: &logger,
    };
    let output = (self.func)(input)?;
    Ok(Erased::new(output))
  }
}
