// tests/registry_tests.rs
mod common;
use common::*;
use lambda_pipeline::{pipeline_data, step_fn, PipelineData, PipelineError, StepInput, StepRegistry, Value};
use std::sync::Arc;
use tracing::Span;

fn shout(input: TestInput<'_>) -> Result<PipelineData, TestError> {
  let text = input.data["text"].as_str().unwrap_or_default().to_uppercase();
  Ok(input.data.with_entries([("text", text)]))
}

fn exclaim(input: TestInput<'_>) -> Result<PipelineData, TestError> {
  let text = format!("{}!", input.data["text"].as_str().unwrap_or_default());
  Ok(input.data.with_entries([("text", text)]))
}

fn registry() -> StepRegistry<TestError> {
  let registry = StepRegistry::new();
  registry.register(step_fn("shout", shout)).unwrap();
  registry.register(step_fn("exclaim", exclaim)).unwrap();
  registry
}

#[test]
fn test_register_and_resolve_in_requested_order() {
  setup_tracing();
  let registry = registry();
  assert_eq!(registry.len(), 2);
  assert_eq!(registry.names(), vec!["shout".to_string(), "exclaim".to_string()]);
  assert!(registry.contains("shout"));

  let steps = registry.resolve(&["exclaim", "shout", "exclaim"]).unwrap();
  let names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
  assert_eq!(names, vec!["exclaim", "shout", "exclaim"]);
}

#[test]
fn test_duplicate_names_are_rejected() {
  setup_tracing();
  let registry = registry();
  match registry.register(step_fn("shout", exclaim)) {
    Err(PipelineError::DuplicateStep { name }) => assert_eq!(name, "shout"),
    other => panic!("Expected DuplicateStep, got {:?}", other),
  }
  assert_eq!(registry.len(), 2);
}

#[test]
fn test_unknown_names_fail_resolution() {
  setup_tracing();
  let registry = registry();
  match registry.resolve(&["shout", "whisper"]) {
    Err(PipelineError::StepNotFound { name }) => assert_eq!(name, "whisper"),
    Err(other) => panic!("Expected StepNotFound, got {:?}", other),
    Ok(_) => panic!("Expected StepNotFound"),
  }
  assert!(registry.get("whisper").is_none());
}

#[test]
fn test_pipeline_from_configured_names() {
  setup_tracing();
  let registry = registry();
  let configured = vec!["shout".to_string(), "exclaim".to_string()];

  let pipeline = registry
    .pipeline::<TestEvent, TestContext, _>(&configured, TestEvent::default(), &test_context(), (), Span::none())
    .unwrap();
  let result = pipeline.run(pipeline_data! { "text" => "hello" }).unwrap();
  assert_eq!(result["text"], Value::from("HELLO!"));
}

#[test]
fn test_registered_steps_are_still_checked_against_the_event() {
  setup_tracing();
  let registry = registry();
  registry
    .register(step_fn(
      "other",
      |input: StepInput<'_, OtherEvent, TestContext>| -> Result<PipelineData, TestError> { Ok(input.data) },
    ))
    .unwrap();

  let result = registry.pipeline::<TestEvent, TestContext, _>(
    &["shout", "other"],
    Arc::new(TestEvent::default()),
    &test_context(),
    (),
    Span::none(),
  );
  assert!(matches!(result, Err(PipelineError::Signature { ref step, .. }) if step == "other"));
}
