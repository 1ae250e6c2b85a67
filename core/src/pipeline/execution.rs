// lambda_pipeline/src/pipeline/execution.rs

//! Contains the `Pipeline::run()` method, which folds a payload through the wrapped steps.

use crate::contract::{CONTEXT, DATA, DEPENDENCIES, EVENT, LOGGER};
use crate::core::erased::{Arguments, Erased};
use crate::core::payload::PipelineData;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use std::any::Any;
use tracing::{event, instrument, span, Level};

impl<E, C, Err> Pipeline<E, C, Err>
where
  E: Any + Send + Sync,
  C: Any + Send + Sync + Clone,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  /// Runs every step in order, starting from `data`.
  ///
  /// Each step's returned payload replaces the current one entirely; nothing is merged.
  /// The payload returned by the last step is the result, and an empty pipeline returns
  /// `data` unchanged.
  ///
  /// The first failing step ends the run: its error is returned and no later step runs.
  /// Errors from step logic come back exactly as the step returned them.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      event_type = %std::any::type_name::<E>(),
      context_type = %std::any::type_name::<C>(),
      num_steps = self.steps.len()
    ),
    err(Display)
  )]
  pub fn run(&self, data: PipelineData) -> Result<PipelineData, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    let result = self
      .steps
      .iter()
      .enumerate()
      .try_fold(data, |data, (step_idx, step)| {
        let step_span = span!(
          Level::INFO,
          "pipeline_step_execution",
          step_name = step.name.as_str(),
          step_index = step_idx
        );
        let _step_span_guard = step_span.enter();

        let output = match (step.invoke)(self.arguments(data)) {
          Ok(output) => output,
          Err(e) => {
            event!(Level::ERROR, error = %e, "Step failed; aborting pipeline.");
            return Err(e);
          }
        };

        // ValidateOutput has already checked the type; a mismatch here is an engine bug.
        let next = output.downcast::<PipelineData>().map_err(|actual| {
          Err::from(PipelineError::Internal(format!(
            "step '{}' output passed validation but is a {}",
            step.name,
            actual.type_name()
          )))
        })?;
        event!(Level::DEBUG, payload_len = next.len(), "Step finished.");
        Ok(next)
      })?;

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(result)
  }

  /// The arguments of one step call: the current payload plus the shared environment.
  fn arguments(&self, data: PipelineData) -> Arguments {
    Arguments::new()
      .with(DATA, Erased::new(data))
      .with(EVENT, Erased::from_arc(self.event.clone()))
      .with(CONTEXT, self.context.clone())
      .with(DEPENDENCIES, Erased::new(self.dependencies.clone()))
      .with(LOGGER, Erased::new(self.logger.clone()))
  }
}
