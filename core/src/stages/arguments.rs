// lambda_pipeline/src/stages/arguments.rs

//! Outermost stage: checks the actual arguments of every call against the step's own
//! declared parameters, and its payload schema if it has one.

use super::Invoker;
use crate::contract::{PayloadSchema, Signature, DATA};
use crate::core::erased::{Arguments, Erased};
use crate::core::payload::PipelineData;
use crate::core::step::Step;
use crate::error::PipelineError;
use std::sync::Arc;
use tracing::{event, Level};

pub(super) fn validate_arguments<Err>(inner: Invoker<Err>, step: &dyn Step<Err>) -> Invoker<Err>
where
  Err: From<PipelineError> + 'static,
{
  let step_name = step.name().to_string();
  let signature = step.signature().clone();
  let schema = step.payload_schema().cloned();

  Arc::new(move |mut args: Arguments| {
    if let Err(err) = check_declared_types(&step_name, &signature, &args) {
      event!(Level::ERROR, step_name = %step_name, error = %err, "Argument validation failed.");
      return Err(Err::from(err));
    }
    if let Some(schema) = &schema {
      match apply_schema(&step_name, schema, &args) {
        Ok(Some(coerced)) => {
          event!(Level::DEBUG, step_name = %step_name, "Payload coerced to the declared schema.");
          args.set(DATA, Erased::new(coerced));
        }
        Ok(None) => {}
        Err(err) => {
          event!(Level::ERROR, step_name = %step_name, error = %err, "Payload schema validation failed.");
          return Err(Err::from(err));
        }
      }
    }
    event!(Level::TRACE, step_name = %step_name, "Arguments validated.");
    inner(args)
  })
}

/// Every declared parameter present with exactly its declared type, and nothing undeclared.
fn check_declared_types(step: &str, signature: &Signature, args: &Arguments) -> Result<(), PipelineError> {
  for param in signature.params() {
    let actual = args
      .get(param.name)
      .ok_or_else(|| PipelineError::validation(step, param.name, "missing argument"))?;
    if actual.type_id() != param.ty.id() {
      return Err(PipelineError::validation(
        step,
        param.name,
        format!("expected type {}, got {}", param.ty, actual.type_name()),
      ));
    }
  }

  if let Some(extra) = args.names().find(|name| signature.param(name).is_none()) {
    return Err(PipelineError::validation(step, extra, "unexpected argument"));
  }
  Ok(())
}

fn apply_schema(step: &str, schema: &PayloadSchema, args: &Arguments) -> Result<Option<PipelineData>, PipelineError> {
  let data = args
    .get(DATA)
    .and_then(|value| value.downcast_ref::<PipelineData>())
    .ok_or_else(|| PipelineError::validation(step, DATA, "payload schema declared but no PipelineData argument"))?;
  schema
    .validate(data)
    .map_err(|violation| PipelineError::validation(step, DATA, violation.to_string()))
}
