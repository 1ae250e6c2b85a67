// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use lambda_pipeline::{step_fn, Pipeline, PipelineData, PipelineError, Step, StepInput};
use std::collections::BTreeMap;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Event and Context Structs ---
#[derive(Clone, Debug, Default)]
pub struct TestEvent {
  pub headers: BTreeMap<String, String>,
  pub body: String,
}

impl TestEvent {
  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.insert(name.to_string(), value.to_string());
    self
  }
}

/// An event type no step below is written for.
#[derive(Clone, Debug, Default)]
pub struct OtherEvent {
  pub id: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestContext {
  pub request_id: String,
  pub visited: Vec<String>,
  pub nested: NestedContext,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NestedContext {
  pub counters: BTreeMap<String, i64>,
  pub shared_tags: Arc<Vec<String>>,
}

pub fn test_context() -> TestContext {
  TestContext {
    request_id: "req-1".to_string(),
    visited: vec!["caller".to_string()],
    nested: NestedContext {
      counters: BTreeMap::from([("seen".to_string(), 0)]),
      shared_tags: Arc::new(vec!["initial".to_string()]),
    },
  }
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("Pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Test step failed: {0}")]
  Step(String),
}

pub type TestPipeline = Pipeline<TestEvent, TestContext, TestError>;
pub type TestInput<'a> = StepInput<'a, TestEvent, TestContext>;

// --- Common Step Creators ---

/// A step that records its call and passes the payload on unchanged.
pub fn counting_step(name: &'static str, calls: Arc<AtomicUsize>) -> Arc<dyn Step<TestError>> {
  shared(step_fn(name, move |input: TestInput<'_>| -> Result<PipelineData, TestError> {
    calls.fetch_add(1, Ordering::SeqCst);
    tracing::debug!(target: "test_steps", step = name, "executed");
    Ok(input.data)
  }))
}

pub fn failing_step(name: &'static str, message: &'static str) -> Arc<dyn Step<TestError>> {
  shared(step_fn(name, move |_input: TestInput<'_>| -> Result<PipelineData, TestError> {
    tracing::warn!(target: "test_steps", step = name, "failing with: '{}'", message);
    Err(TestError::Step(message.to_string()))
  }))
}

pub fn shared(step: impl Step<TestError> + 'static) -> Arc<dyn Step<TestError>> {
  Arc::new(step)
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn new_counter() -> Arc<AtomicUsize> {
  Arc::new(AtomicUsize::new(0))
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
  counter.load(Ordering::SeqCst)
}
