// lambda_pipeline/src/stages/output.rs

//! Checks the exact runtime type of a step's return value against its declared return type.

use super::Invoker;
use crate::core::erased::Arguments;
use crate::core::step::Step;
use crate::error::PipelineError;
use std::sync::Arc;
use tracing::{event, Level};

pub(super) fn validate_output<Err>(inner: Invoker<Err>, step: &dyn Step<Err>) -> Invoker<Err>
where
  Err: From<PipelineError> + 'static,
{
  let step_name = step.name().to_string();
  let expected = step.signature().output();

  Arc::new(move |args: Arguments| {
    let output = inner(args)?;
    // Exact match only; there is no notion of a compatible type.
    if output.type_id() != expected.id() {
      event!(
        Level::ERROR,
        step_name = %step_name,
        expected = expected.name(),
        actual = output.type_name(),
        "Step returned an unexpected type."
      );
      return Err(Err::from(PipelineError::OutputType {
        step: step_name.clone(),
        expected: expected.name().to_string(),
        actual: output.type_name().to_string(),
      }));
    }
    Ok(output)
  })
}
