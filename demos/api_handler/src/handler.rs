// demos/api_handler/src/handler.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::event::{ApiEvent, LambdaContext};
use crate::response::Response;
use crate::steps;
use lambda_pipeline::{Dependencies, Pipeline, PipelineData, Step};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{event, instrument, Level, Span};

/// Built once per process; `handle` is called for every incoming event.
pub struct ApiHandler {
  steps: Vec<Arc<dyn Step<AppError>>>,
  dependencies: Dependencies,
}

impl ApiHandler {
  pub fn new(config: AppConfig) -> Self {
    Self {
      steps: steps::steps(),
      dependencies: steps::build_shared_dependencies(config),
    }
  }

  /// Runs the pipeline for one raw event and always produces a response.
  ///
  /// - success: the response rendered by the last step (200)
  /// - `AppError::Handler`: 400 with `{"message": <error>}`
  /// - anything else: 500 with a generic message; the details are only logged
  #[instrument(
    name = "ApiHandler::handle",
    skip_all,
    fields(request_id = %context.aws_request_id, function_name = %context.function_name)
  )]
  pub fn handle(&self, raw_event: JsonValue, context: &LambdaContext) -> Response {
    match self.process(raw_event, context) {
      Ok(response) => response,
      Err(AppError::Handler(message)) => Response::bad_request_400(json!({ "message": message }).to_string()),
      Err(err) => {
        event!(Level::ERROR, error = ?err, "Request failed.");
        Response::internal_error_500(&format!("{}: {}", error_kind(&err), err))
      }
    }
  }

  fn process(&self, raw_event: JsonValue, context: &LambdaContext) -> Result<Response> {
    let event = ApiEvent::from_json(raw_event)?;
    let pipeline = Pipeline::<ApiEvent, LambdaContext, AppError>::builder()
      .steps(self.steps.iter().cloned())
      .dependencies(&self.dependencies)
      .logger(Span::current())
      .build(event, context)?;

    let data = pipeline.run(PipelineData::new())?;
    Response::from_payload(&data)
  }
}

fn error_kind(err: &AppError) -> &'static str {
  match err {
    AppError::Handler(_) => "HandlerError",
    AppError::Pipeline { .. } => "PipelineError",
    AppError::Config(_) => "ConfigError",
    AppError::Event(_) => "EventError",
    AppError::Internal(_) => "InternalError",
  }
}
