// demos/api_handler/src/event.rs

//! The incoming request and the invocation context, as handed over by the runtime.

use crate::errors::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::env;

/// An API gateway proxy event. Unknown fields are ignored.
///
/// Header values are kept as raw JSON: gateways send strings, but test events routinely
/// carry numbers (`"auth_level": 10`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
  #[serde(default)]
  pub resource: Option<String>,
  #[serde(default)]
  pub path: Option<String>,
  #[serde(default)]
  pub http_method: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub headers: BTreeMap<String, JsonValue>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub query_string_parameters: BTreeMap<String, String>,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(default)]
  pub is_base64_encoded: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiEvent {
  pub fn from_json(raw: JsonValue) -> Result<Self> {
    Ok(serde_json::from_value(raw)?)
  }

  /// Header lookup; falls back to a case-insensitive match.
  pub fn header(&self, name: &str) -> Option<&JsonValue> {
    self.headers.get(name).or_else(|| {
      self
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
    })
  }

  /// The header rendered as text. Strings are returned as is, other scalars in their JSON form.
  pub fn header_text(&self, name: &str) -> Option<String> {
    match self.header(name)? {
      JsonValue::Null => None,
      JsonValue::String(s) => Some(s.clone()),
      other => Some(other.to_string()),
    }
  }
}

/// Invocation metadata for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LambdaContext {
  pub function_name: String,
  pub function_version: String,
  pub memory_limit_in_mb: u32,
  pub aws_request_id: String,
  pub log_group_name: String,
  pub log_stream_name: String,
}

impl LambdaContext {
  /// Reads the function metadata the runtime exposes through the environment.
  pub fn from_env(aws_request_id: impl Into<String>) -> Self {
    let get = |name: &str| env::var(name).unwrap_or_default();
    Self {
      function_name: get("AWS_LAMBDA_FUNCTION_NAME"),
      function_version: get("AWS_LAMBDA_FUNCTION_VERSION"),
      memory_limit_in_mb: get("AWS_LAMBDA_FUNCTION_MEMORY_SIZE").parse().unwrap_or(128),
      aws_request_id: aws_request_id.into(),
      log_group_name: get("AWS_LAMBDA_LOG_GROUP_NAME"),
      log_stream_name: get("AWS_LAMBDA_LOG_STREAM_NAME"),
    }
  }
}
