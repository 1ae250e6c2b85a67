// demos/api_handler/src/errors.rs

use lambda_pipeline::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// An expected, client-facing failure. Rendered as a 400 with the message as body.
  #[error("{0}")]
  Handler(String),

  #[error("Pipeline Error: {source}")]
  Pipeline {
    #[from] // Contract violations and other engine failures
    source: PipelineError,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Invalid Event: {0}")]
  Event(#[from] serde_json::Error),

  #[error("Internal Server Error: {0}")]
  Internal(#[from] anyhow::Error),
}

impl AppError {
  pub fn handler(message: impl Into<String>) -> Self {
    AppError::Handler(message.into())
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
