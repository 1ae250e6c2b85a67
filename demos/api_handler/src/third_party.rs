// demos/api_handler/src/third_party.rs

//! Stand-in for an external validation library whose API does not follow the step contract.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue(pub &'static str);

impl fmt::Display for InvalidValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Invalid value for '{}'", self.0)
  }
}

impl std::error::Error for InvalidValue {}

pub fn validate_x_request_url(x_request_url: Option<&str>) -> Result<(), InvalidValue> {
  if x_request_url == Some("something") {
    return Err(InvalidValue("x_request_url"));
  }
  Ok(())
}
