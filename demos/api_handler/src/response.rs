// demos/api_handler/src/response.rs

use crate::errors::Result;
use anyhow::anyhow;
use lambda_pipeline::{pipeline_data, PipelineData, Value};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

pub const STATUS_OK: &str = "200";
pub const STATUS_BAD_REQUEST: &str = "400";
pub const STATUS_INTERNAL_ERROR: &str = "500";

/// What the handler returns to the gateway. `body` is a JSON document serialized to text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub status_code: String,
  pub body: String,
}

impl Response {
  /// Builds a response and logs it: errors at `ERROR` (with `details` if given), the rest at `INFO`.
  fn new(status_code: &str, body: String, details: Option<&str>) -> Self {
    let is_error = status_code.parse::<u16>().map(|code| code >= 300).unwrap_or(true);
    if is_error {
      tracing::error!(status_code, "{}", details.unwrap_or(&body));
    } else {
      tracing::info!(status_code, "{}", body);
    }
    Self {
      status_code: status_code.to_string(),
      body,
    }
  }

  pub fn ok_200(body: String) -> Self {
    Self::new(STATUS_OK, body, None)
  }

  pub fn bad_request_400(body: String) -> Self {
    Self::new(STATUS_BAD_REQUEST, body, None)
  }

  /// The body is always the generic message; `details` only goes to the log.
  pub fn internal_error_500(details: &str) -> Self {
    let body = json!({ "message": "Internal Server Error" }).to_string();
    Self::new(STATUS_INTERNAL_ERROR, body, Some(details))
  }

  pub fn into_payload(self) -> PipelineData {
    pipeline_data! { "status_code" => self.status_code, "body" => self.body }
  }

  /// Reads back a response rendered into a payload by the last step.
  pub fn from_payload(data: &PipelineData) -> Result<Self> {
    let field = |name: &str| {
      data
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("final payload has no string field '{}': {:?}", name, data))
    };
    Ok(Self {
      status_code: field("status_code")?,
      body: field("body")?,
    })
  }

  pub fn body_json(&self) -> Result<JsonValue> {
    Ok(serde_json::from_str(&self.body)?)
  }
}

/// Converts a payload value to JSON. Non-finite floats become `null`.
pub fn value_to_json(value: &Value) -> JsonValue {
  match value {
    Value::Null => JsonValue::Null,
    Value::Bool(b) => JsonValue::Bool(*b),
    Value::Int(i) => JsonValue::from(*i),
    Value::Float(f) => serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
    Value::Str(s) => JsonValue::String(s.clone()),
    Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
    Value::Map(map) => JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect()),
  }
}
