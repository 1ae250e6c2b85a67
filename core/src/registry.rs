// lambda_pipeline/src/registry.rs

//! Defines `StepRegistry<Err>`, a name-keyed registry of steps.
//!
//! Handlers usually know their steps statically, but a registry lets the step list of a
//! pipeline come from configuration: steps are registered once at startup and resolved
//! by name for every incoming event.

use crate::core::dependencies::IntoDependencies;
use crate::core::step::Step;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{event, instrument, Level, Span};

/// Steps by name, in registration order.
pub struct StepRegistry<Err> {
  steps: RwLock<IndexMap<String, Arc<dyn Step<Err>>>>,
}

impl<Err> StepRegistry<Err> {
  pub fn new() -> Self {
    Self {
      steps: RwLock::new(IndexMap::new()),
    }
  }

  /// Adds `step` under its own name. A name can only be registered once.
  pub fn register(&self, step: impl Step<Err> + 'static) -> Result<(), PipelineError> {
    self.register_shared(Arc::new(step))
  }

  pub fn register_shared(&self, step: Arc<dyn Step<Err>>) -> Result<(), PipelineError> {
    let name = step.name().to_string();
    let mut steps = self.steps.write();
    if steps.contains_key(&name) {
      event!(Level::WARN, step_name = %name, "Step name already registered.");
      return Err(PipelineError::DuplicateStep { name });
    }
    event!(Level::DEBUG, step_name = %name, signature = %step.signature(), "Registering step.");
    steps.insert(name, step);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn Step<Err>>> {
    self.steps.read().get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.steps.read().contains_key(name)
  }

  /// Looks up every name in order. Fails on the first unknown name.
  pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<dyn Step<Err>>>, PipelineError> {
    let steps = self.steps.read();
    names
      .iter()
      .map(|name| {
        let name = name.as_ref();
        steps.get(name).cloned().ok_or_else(|| {
          event!(Level::ERROR, step_name = name, "No step registered under this name.");
          PipelineError::StepNotFound { name: name.to_string() }
        })
      })
      .collect()
  }

  /// Registered names, in registration order.
  pub fn names(&self) -> Vec<String> {
    self.steps.read().keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.steps.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.read().is_empty()
  }
}

impl<Err> StepRegistry<Err>
where
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Resolves `names` and constructs a pipeline from them for one event.
  #[instrument(name = "StepRegistry::pipeline", skip_all, fields(num_steps = names.len()), err(Display))]
  pub fn pipeline<E, C, S>(
    &self,
    names: &[S],
    event: impl Into<Arc<E>>,
    context: &C,
    dependencies: impl IntoDependencies,
    logger: Span,
  ) -> Result<Pipeline<E, C, Err>, PipelineError>
  where
    E: Any + Send + Sync,
    C: Any + Send + Sync + Clone,
    S: AsRef<str>,
  {
    let steps = self.resolve(names)?;
    Pipeline::construct(steps, event, context, dependencies, logger)
  }
}

impl<Err> Default for StepRegistry<Err> {
  fn default() -> Self {
    Self::new()
  }
}

impl<Err> fmt::Debug for StepRegistry<Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepRegistry").field("steps", &self.names()).finish()
  }
}
