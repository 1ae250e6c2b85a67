// tests/context_isolation_tests.rs
mod common;
use common::*;
use lambda_pipeline::{step_fn, PipelineData, Step};
use parking_lot::Mutex;
use std::sync::Arc;

type Seen = Arc<Mutex<Vec<TestContext>>>;

/// Records the context it was given, then tampers with every level of it.
fn tampering_step(name: &'static str, seen: Seen) -> Arc<dyn Step<TestError>> {
  shared(step_fn(name, move |input: TestInput<'_>| -> Result<PipelineData, TestError> {
    seen.lock().push(input.context.clone());

    input.context.request_id = format!("changed-by-{}", name);
    input.context.visited.push(name.to_string());
    *input.context.nested.counters.entry("seen".to_string()).or_default() += 1;
    Arc::make_mut(&mut input.context.nested.shared_tags).push(name.to_string());
    Ok(input.data)
  }))
}

#[test]
fn test_every_step_sees_the_snapshot_taken_at_construction() {
  setup_tracing();
  let seen: Seen = Arc::default();
  let context = test_context();

  let pipeline = TestPipeline::builder()
    .steps(vec![
      tampering_step("first", Arc::clone(&seen)),
      tampering_step("second", Arc::clone(&seen)),
      tampering_step("third", Arc::clone(&seen)),
    ])
    .build(TestEvent::default(), &context)
    .unwrap();

  pipeline.run(PipelineData::new()).unwrap();

  let seen = seen.lock();
  assert_eq!(seen.len(), 3);
  for observed in seen.iter() {
    assert_eq!(observed, &context);
    assert_eq!(observed.nested.counters["seen"], 0);
    assert_eq!(*observed.nested.shared_tags, vec!["initial".to_string()]);
  }
}

#[test]
fn test_caller_context_is_untouched_by_a_run() {
  setup_tracing();
  let context = test_context();
  let before = context.clone();

  let pipeline = TestPipeline::builder()
    .steps(vec![tampering_step("only", Arc::default())])
    .build(TestEvent::default(), &context)
    .unwrap();
  pipeline.run(PipelineData::new()).unwrap();
  pipeline.run(PipelineData::new()).unwrap();

  assert_eq!(context, before);
  assert_eq!(*context.nested.shared_tags, vec!["initial".to_string()]);
}

#[test]
fn test_later_runs_do_not_see_earlier_runs() {
  setup_tracing();
  let seen: Seen = Arc::default();
  let pipeline = TestPipeline::builder()
    .steps(vec![tampering_step("again", Arc::clone(&seen))])
    .build(TestEvent::default(), &test_context())
    .unwrap();

  for _ in 0..3 {
    pipeline.run(PipelineData::new()).unwrap();
  }
  assert!(seen.lock().iter().all(|ctx| ctx == &test_context()));
}

#[test]
fn test_changes_to_the_callers_context_after_construction_are_not_seen() {
  setup_tracing();
  let seen: Seen = Arc::default();
  let mut context = test_context();

  let pipeline = TestPipeline::builder()
    .steps(vec![tampering_step("late", Arc::clone(&seen))])
    .build(TestEvent::default(), &context)
    .unwrap();

  context.request_id = "rewritten".to_string();
  context.nested.counters.insert("seen".to_string(), 99);
  pipeline.run(PipelineData::new()).unwrap();

  assert_eq!(seen.lock()[0], test_context());
}
