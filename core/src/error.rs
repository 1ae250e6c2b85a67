// lambda_pipeline/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// A step's declared signature does not match the contract synthesized for the
  /// pipeline's event type. Only produced while a pipeline is being constructed.
  #[error("step '{step}' does not meet the expected signature:\n{expected}\nGot:\n{actual}\nMismatches: {}", mismatches.join("; "))]
  Signature {
    step: String,
    expected: String,
    actual: String,
    mismatches: Vec<String>,
  },

  /// An actual argument failed the step's declared parameter types (or its payload schema).
  /// The step body was not entered.
  #[error("Validation failed for argument '{param}' of step '{step}': {reason}")]
  Validation { step: String, param: String, reason: String },

  #[error("step '{step}': was expecting a return type '{expected}', but got '{actual}'")]
  OutputType {
    step: String,
    expected: String,
    actual: String,
  },

  /// A failure raised by step logic itself, for pipelines using the default error type.
  #[error("Error in step logic. Source: {source}")]
  Step {
    #[source]
    source: AnyhowError,
  },

  #[error("Missing key: {key}")]
  MissingKey { key: String },

  #[error("Dependency '{key}' is not of type {expected}")]
  DependencyType { key: String, expected: String },

  #[error("Step not found: {name}")]
  StepNotFound { name: String },

  #[error("Step already registered: {name}")]
  DuplicateStep { name: String },

  #[error("Internal pipeline error: {0}")]
  Internal(String),
}

impl PipelineError {
  pub(crate) fn validation(step: &str, param: &str, reason: impl Into<String>) -> Self {
    PipelineError::Validation {
      step: step.to_string(),
      param: param.to_string(),
      reason: reason.into(),
    }
  }

  /// True for the three failure kinds the engine itself raises around a step call.
  pub fn is_contract_violation(&self) -> bool {
    matches!(
      self,
      PipelineError::Signature { .. } | PipelineError::Validation { .. } | PipelineError::OutputType { .. }
    )
  }
}

// Steps written against the default error type can use `?` on anything anyhow accepts.
impl From<AnyhowError> for PipelineError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<PipelineError>() {
      Ok(pipeline_err) => pipeline_err,
      Err(err) => PipelineError::Step { source: err },
    }
  }
}

pub type PipelineResult<T, E = PipelineError> = std::result::Result<T, E>;
