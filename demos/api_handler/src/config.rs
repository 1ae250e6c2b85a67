// demos/api_handler/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_MIN_AUTH_LEVEL: i64 = 2;

/// Process-wide settings, loaded once and shared with the steps through `Dependencies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  /// Lowest `auth_level` header value that is let through.
  pub min_auth_level: i64,
  /// Makes `a_flaky_step` fail, to exercise the 500 path.
  pub flake_out: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      min_auth_level: DEFAULT_MIN_AUTH_LEVEL,
      flake_out: false,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let min_auth_level = match env::var("MIN_AUTH_LEVEL") {
      Ok(raw) => raw
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::Config(format!("Invalid MIN_AUTH_LEVEL '{}': {}", raw, e)))?,
      Err(_) => DEFAULT_MIN_AUTH_LEVEL,
    };

    // Any non-empty value other than "0"/"false" turns flaking on.
    let flake_out = env::var("FLAKE_OUT")
      .map(|raw| {
        let raw = raw.trim();
        !raw.is_empty() && raw != "0" && !raw.eq_ignore_ascii_case("false")
      })
      .unwrap_or(false);

    tracing::info!(min_auth_level, flake_out, "Application configuration loaded successfully.");
    Ok(Self {
      min_auth_level,
      flake_out,
    })
  }
}
