// demos/api_handler/src/main.rs

//! Runs the handler once, locally: reads a JSON event from the file given as first
//! argument (or stdin), prints the JSON response.

use anyhow::Context;
use api_handler::{ApiHandler, AppConfig, LambdaContext};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  // Initialize tracing subscriber for logging (JSON lines, RUST_LOG override)
  tracing_subscriber::fmt()
    .json()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let raw = match std::env::args().nth(1) {
    Some(path) => std::fs::read_to_string(&path).with_context(|| format!("reading event file '{}'", path))?,
    None => {
      let mut buffer = String::new();
      std::io::stdin().read_to_string(&mut buffer).context("reading event from stdin")?;
      buffer
    }
  };
  let raw_event: serde_json::Value = serde_json::from_str(&raw).context("event is not valid JSON")?;

  let config = AppConfig::from_env()?;
  let handler = ApiHandler::new(config);
  let context = LambdaContext::from_env("local-invocation");

  let response = handler.handle(raw_event, &context);
  println!("{}", serde_json::to_string_pretty(&response)?);
  Ok(())
}
