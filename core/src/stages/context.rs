// lambda_pipeline/src/stages/context.rs

//! Innermost stage: the step never sees the context its caller passed, only a fresh copy
//! of the snapshot taken when the pipeline was built.

use super::Invoker;
use crate::contract::CONTEXT;
use crate::core::erased::{Arguments, Erased};
use std::sync::Arc;
use tracing::{event, Level};

/// Produces a new, independent copy of the context snapshot on every call.
pub(crate) type ContextFactory = Arc<dyn Fn() -> Erased + Send + Sync>;

pub(super) fn isolate_context<Err>(inner: Invoker<Err>, fresh_context: ContextFactory) -> Invoker<Err>
where
  Err: 'static,
{
  Arc::new(move |mut args: Arguments| {
    // Cloned per call, so even nested mutations by one step stay invisible to the next.
    args.set(CONTEXT, fresh_context());
    event!(Level::TRACE, "Context replaced with pipeline snapshot.");
    inner(args)
  })
}
