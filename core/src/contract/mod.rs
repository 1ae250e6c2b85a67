// lambda_pipeline/src/contract/mod.rs

//! The step contract: the signature every step of one pipeline must declare, and the
//! construction-time check that enforces it.

pub mod schema;
pub mod signature;

pub use schema::{FieldSpec, PayloadSchema, SchemaViolation};
pub use signature::{Param, Signature, SignatureBuilder, TypeDescriptor};

use crate::core::dependencies::Dependencies;
use crate::core::payload::PipelineData;
use crate::core::step::Step;
use crate::error::PipelineError;
use std::any::Any;
use tracing::{event, Level};

/// Parameter names of the step contract.
pub const DATA: &str = "data";
pub const EVENT: &str = "event";
pub const CONTEXT: &str = "context";
pub const DEPENDENCIES: &str = "dependencies";
pub const LOGGER: &str = "logger";

/// The reference signature synthesized for a pipeline over event type `E` and context type `C`:
///
/// `(data: PipelineData, event: E, context: C, dependencies: Dependencies, logger: Span) -> PipelineData`
///
/// It is never invoked, only compared against each step's declared signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepContract {
  signature: Signature,
}

impl StepContract {
  pub fn for_event<E: Any, C: Any>() -> Self {
    let signature = Signature::builder()
      .param::<PipelineData>(DATA)
      .param::<E>(EVENT)
      .param::<C>(CONTEXT)
      .param::<Dependencies>(DEPENDENCIES)
      .param::<tracing::Span>(LOGGER)
      .returns::<PipelineData>();
    Self { signature }
  }

  pub fn signature(&self) -> &Signature {
    &self.signature
  }

  /// Fails with `PipelineError::Signature` if `step` does not declare exactly this contract.
  pub fn enforce<Err>(&self, step: &dyn Step<Err>) -> Result<(), PipelineError> {
    let declared = step.signature();
    if *declared == self.signature {
      event!(Level::TRACE, step_name = step.name(), "Step signature matches contract.");
      return Ok(());
    }

    let mismatches = self.signature.mismatches(declared);
    event!(
      Level::ERROR,
      step_name = step.name(),
      mismatches = ?mismatches,
      "Step signature does not match contract."
    );
    Err(PipelineError::Signature {
      step: step.name().to_string(),
      expected: self.signature.to_string(),
      actual: declared.to_string(),
      mismatches,
    })
  }
}
