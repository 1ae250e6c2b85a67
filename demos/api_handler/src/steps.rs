// demos/api_handler/src/steps.rs

//! The request-handling steps, in execution order, and the dependencies they share.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::event::{ApiEvent, LambdaContext};
use crate::response::{value_to_json, Response};
use crate::third_party;
use anyhow::{anyhow, Context};
use lambda_pipeline::{
  pipeline_data, step_fn, Dependencies, Dependency, PayloadSchema, PipelineData, Step, StepInput, ValueKind,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub type ApiInput<'a> = StepInput<'a, ApiEvent, LambdaContext>;

/// Key of the `AppConfig` in the shared dependency bag.
pub const CONFIG: &str = "config";

pub fn build_shared_dependencies(config: AppConfig) -> Dependencies {
  Dependencies::from([(CONFIG.to_string(), Dependency::new(config))])
}

/// Rejects callers whose `auth_level` header is below the configured minimum.
/// A missing or non-numeric header is a server-side failure, not a client error.
#[instrument(name = "step::authorise", skip_all, err)]
pub fn authorise(input: ApiInput<'_>) -> Result<PipelineData> {
  let config = input.dependencies.get_as::<AppConfig>(CONFIG)?;
  let raw = input
    .event
    .header("auth_level")
    .ok_or_else(|| anyhow!("header 'auth_level' is missing"))?;

  let auth_level = match raw {
    JsonValue::Number(n) => n.as_i64().ok_or_else(|| anyhow!("auth_level {} is not an integer", n))?,
    JsonValue::String(s) => s
      .trim()
      .parse::<i64>()
      .with_context(|| format!("invalid literal for auth_level: '{}'", s))?,
    other => return Err(anyhow!("auth_level has unsupported value {}", other).into()),
  };

  if auth_level < config.min_auth_level {
    warn!(auth_level, min_auth_level = config.min_auth_level, "Caller below minimum authorisation.");
    return Err(AppError::handler("Minimum authorisation not satisfied"));
  }
  Ok(input.data)
}

/// Adapts the third-party validator: its error becomes a client-facing one.
#[instrument(name = "step::validate_x_request_url", skip_all, err)]
pub fn validate_x_request_url(input: ApiInput<'_>) -> Result<PipelineData> {
  let x_request_url = input.event.header_text("x-request-url");
  third_party::validate_x_request_url(x_request_url.as_deref()).map_err(|e| AppError::handler(e.to_string()))?;
  Ok(input.data)
}

#[instrument(name = "step::a_flaky_step", skip_all, err)]
pub fn a_flaky_step(input: ApiInput<'_>) -> Result<PipelineData> {
  let config = input.dependencies.get_as::<AppConfig>(CONFIG)?;
  if config.flake_out {
    return Err(anyhow!("Some I/O flaked out!").into());
  }
  Ok(input.data)
}

pub fn intermediate_step(input: ApiInput<'_>) -> Result<PipelineData> {
  input.logger.in_scope(|| {
    debug!(
      function_name = %input.context.function_name,
      request_id = %input.context.aws_request_id,
      "Preparing document lookup."
    )
  });
  Ok(pipeline_data! { "something_for_later" => "hello, world" })
}

pub fn read_document_from_db(input: ApiInput<'_>) -> Result<PipelineData> {
  let message = input.data.try_get("something_for_later")?.clone();
  let document = pipeline_data! {
    "id" => 123,
    "content-type" => "application/json",
    "message" => message,
  };
  Ok(pipeline_data! { "body" => document })
}

pub fn render_response(input: ApiInput<'_>) -> Result<PipelineData> {
  let body = value_to_json(input.data.try_get("body")?);
  Ok(Response::ok_200(body.to_string()).into_payload())
}

/// Every step in execution order.
pub fn steps() -> Vec<Arc<dyn Step<AppError>>> {
  vec![
    Arc::new(step_fn("authorise", authorise)),
    Arc::new(step_fn("validate_x_request_url", validate_x_request_url)),
    Arc::new(step_fn("a_flaky_step", a_flaky_step)),
    Arc::new(step_fn("intermediate_step", intermediate_step)),
    Arc::new(
      step_fn("read_document_from_db", read_document_from_db)
        .with_schema(PayloadSchema::new().require("something_for_later", ValueKind::Str)),
    ),
    Arc::new(
      step_fn("render_response", render_response).with_schema(PayloadSchema::new().require("body", ValueKind::Map)),
    ),
  ]
}
