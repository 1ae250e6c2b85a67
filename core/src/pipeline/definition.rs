// lambda_pipeline/src/pipeline/definition.rs

//! Contains the `Pipeline<E, C, Err>` struct and its construction: contract enforcement,
//! freezing of the shared environment, and the wrapping of every step in the call-time stages.

use crate::contract::StepContract;
use crate::core::dependencies::{Dependencies, IntoDependencies};
use crate::core::erased::Erased;
use crate::core::step::Step;
use crate::error::PipelineError;
use crate::stages::{self, ContextFactory, Invoker};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level, Span};

/// A step after construction: its name and the fully wrapped callable.
pub(crate) struct WrappedStep<Err> {
  pub(crate) name: String,
  pub(crate) invoke: Invoker<Err>,
}

/// An executable chain of steps for one event.
///
/// `E` is the event type the pipeline was built for and fixes the step contract.
/// `C` is the execution context type; the pipeline keeps a private snapshot of it.
/// `Err` is the error type step bodies return. Failures the pipeline detects itself
/// (`PipelineError`) are converted into it.
///
/// Construction enforces the contract on every step and fails before any payload flows;
/// see [`Pipeline::construct`]. Running is [`Pipeline::run`].
pub struct Pipeline<E, C, Err = PipelineError>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<WrappedStep<Err>>,
  pub(crate) event: Arc<E>,
  /// The snapshot, as handed to each call before `IsolateContext` swaps in a fresh copy.
  pub(crate) context: Erased,
  pub(crate) dependencies: Dependencies,
  pub(crate) logger: Span,
  pub(crate) contract: StepContract,
  _context_type: PhantomData<fn() -> C>,
}

impl<E, C, Err> Pipeline<E, C, Err>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Builds a pipeline from an ordered list of steps and the environment they share.
  ///
  /// - `event` is frozen behind an `Arc` and shared read-only by every step.
  /// - `context` is copied once, here; steps only ever see copies of that snapshot, so
  ///   neither the caller's value nor the snapshot can be changed by a step.
  /// - `dependencies` is frozen into a [`Dependencies`] bag unless it already is one.
  /// - `logger` is handed to every step as is.
  ///
  /// Fails with `PipelineError::Signature` on the first step whose declared signature does
  /// not match `StepContract::for_event::<E, C>()`. No pipeline is produced in that case.
  #[instrument(
    name = "Pipeline::construct",
    skip_all,
    fields(event_type = %std::any::type_name::<E>(), context_type = %std::any::type_name::<C>()),
    err(Display)
  )]
  pub fn construct<S, D>(
    steps: S,
    event: impl Into<Arc<E>>,
    context: &C,
    dependencies: D,
    logger: Span,
  ) -> Result<Self, PipelineError>
  where
    S: IntoIterator<Item = Arc<dyn Step<Err>>>,
    D: IntoDependencies,
  {
    let event: Arc<E> = event.into();
    let dependencies = dependencies.into_dependencies();
    let snapshot = Arc::new(context.clone());

    let contract = StepContract::for_event::<E, C>();

    let fresh_context: ContextFactory = {
      let snapshot = Arc::clone(&snapshot);
      Arc::new(move || Erased::new(C::clone(&snapshot)))
    };

    let mut wrapped = Vec::new();
    for step in steps {
      // Static gate: nothing is wrapped for a step that breaks the contract.
      contract.enforce(step.as_ref())?;
      wrapped.push(WrappedStep {
        name: step.name().to_string(),
        invoke: stages::compose(&step, &fresh_context),
      });
    }

    event!(Level::DEBUG, num_steps = wrapped.len(), "Pipeline constructed.");
    Ok(Self {
      steps: wrapped,
      event,
      context: Erased::from_arc(snapshot),
      dependencies,
      logger,
      contract,
      _context_type: PhantomData,
    })
  }

  /// Starts a fluent builder. The event and context are supplied last, in `build`.
  pub fn builder() -> PipelineBuilder<E, C, Err> {
    PipelineBuilder {
      steps: Vec::new(),
      dependencies: Dependencies::new(),
      logger: None,
      _types: PhantomData,
    }
  }

  pub fn contract(&self) -> &StepContract {
    &self.contract
  }

  pub fn event(&self) -> &E {
    &self.event
  }

  pub fn dependencies(&self) -> &Dependencies {
    &self.dependencies
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> impl Iterator<Item = &str> + '_ {
    self.steps.iter().map(|s| s.name.as_str())
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }
}

impl<E, C, Err> fmt::Debug for Pipeline<E, C, Err>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("steps", &self.step_names().collect::<Vec<_>>())
      .field("event_type", &std::any::type_name::<E>())
      .field("context_type", &std::any::type_name::<C>())
      .field("dependencies", &self.dependencies)
      .finish()
  }
}

/// Collects steps, dependencies and a logger, then builds a [`Pipeline`] for one event.
pub struct PipelineBuilder<E, C, Err> {
  steps: Vec<Arc<dyn Step<Err>>>,
  dependencies: Dependencies,
  logger: Option<Span>,
  _types: PhantomData<fn(E, C)>,
}

impl<E, C, Err> PipelineBuilder<E, C, Err>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Appends a step.
  pub fn step(mut self, step: impl Step<Err> + 'static) -> Self {
    self.steps.push(Arc::new(step));
    self
  }

  /// Appends steps that are already shared, e.g. resolved from a `StepRegistry`.
  pub fn steps<I>(mut self, steps: I) -> Self
  where
    I: IntoIterator<Item = Arc<dyn Step<Err>>>,
  {
    self.steps.extend(steps);
    self
  }

  pub fn dependencies(mut self, dependencies: impl IntoDependencies) -> Self {
    self.dependencies = dependencies.into_dependencies();
    self
  }

  /// The span handed to steps as their logger. Defaults to the span current at `build`.
  pub fn logger(mut self, logger: Span) -> Self {
    self.logger = Some(logger);
    self
  }

  pub fn build(self, event: impl Into<Arc<E>>, context: &C) -> Result<Pipeline<E, C, Err>, PipelineError> {
    let logger = self.logger.unwrap_or_else(Span::current);
    Pipeline::construct(self.steps, event, context, self.dependencies, logger)
  }
}
