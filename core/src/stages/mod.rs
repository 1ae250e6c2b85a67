// lambda_pipeline/src/stages/mod.rs

//! The call-time stages wrapped around every step body.
//!
//! Each stage turns an inner `Invoker` into an outer one. The fixed order, outermost
//! first, is `Stage::ORDER`:
//!
//! 1. `ValidateArguments`: actual arguments vs declared parameter types (and payload schema).
//! 2. `ValidateOutput`: exact runtime type of the returned value, checked on the way out.
//! 3. `IsolateContext`: swaps in a fresh copy of the pipeline's context snapshot.
//!
//! The raw step body sits inside `IsolateContext`.

mod arguments;
mod context;
mod output;

use crate::core::erased::{Arguments, Erased};
use crate::core::step::Step;
use crate::error::PipelineError;
use std::fmt;
use std::sync::Arc;

pub(crate) use context::ContextFactory;

/// A callable step, possibly already wrapped in some stages.
pub type Invoker<Err> = Arc<dyn Fn(Arguments) -> Result<Erased, Err> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  ValidateArguments,
  ValidateOutput,
  IsolateContext,
}

impl Stage {
  /// Outermost first.
  pub const ORDER: [Stage; 3] = [Stage::ValidateArguments, Stage::ValidateOutput, Stage::IsolateContext];

  fn wrap<Err>(self, inner: Invoker<Err>, step: &Arc<dyn Step<Err>>, fresh_context: &ContextFactory) -> Invoker<Err>
  where
    Err: From<PipelineError> + 'static,
  {
    match self {
      Stage::ValidateArguments => arguments::validate_arguments(inner, step.as_ref()),
      Stage::ValidateOutput => output::validate_output(inner, step.as_ref()),
      Stage::IsolateContext => context::isolate_context(inner, Arc::clone(fresh_context)),
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::ValidateArguments => "validate_arguments",
      Stage::ValidateOutput => "validate_output",
      Stage::IsolateContext => "isolate_context",
    };
    f.write_str(name)
  }
}

/// Wraps the raw body of `step` in every stage of `Stage::ORDER`, innermost first.
pub(crate) fn compose<Err>(step: &Arc<dyn Step<Err>>, fresh_context: &ContextFactory) -> Invoker<Err>
where
  Err: From<PipelineError> + 'static,
{
  let body = Arc::clone(step);
  let raw: Invoker<Err> = Arc::new(move |args| body.call(args));

  Stage::ORDER
    .iter()
    .rev()
    .fold(raw, |inner, stage| stage.wrap(inner, step, fresh_context))
}
