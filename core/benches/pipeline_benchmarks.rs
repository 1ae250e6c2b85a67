use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lambda_pipeline::{
  pipeline_data, step_fn, FrozenMap, PayloadSchema, Pipeline, PipelineData, PipelineError, Step, StepInput, Value,
  ValueKind,
};
use std::sync::Arc;

// --- Common Benchmark Event, Context and Error ---
#[derive(Clone, Debug, Default)]
struct BenchEvent;

// Sized so the per-step context clone is part of what is measured.
#[derive(Clone, Debug, Default)]
struct BenchContext {
  tags: Vec<String>,
}

// Using PipelineError directly for benchmark simplicity.
type BenchError = PipelineError;
type BenchInput<'a> = StepInput<'a, BenchEvent, BenchContext>;

// --- Helper: step that bumps a counter field ---
fn increment_step(name: String) -> Arc<dyn Step<BenchError>> {
  Arc::new(step_fn(name, |input: BenchInput<'_>| -> Result<PipelineData, BenchError> {
    let counter = input.data.get("counter").and_then(Value::as_int).unwrap_or_default();
    criterion::black_box(input.context.tags.len());
    Ok(input.data.with_entries([("counter", counter + 1)]))
  }))
}

// --- Helper: same, behind a payload schema that needs coercion ---
fn coercing_step(name: String) -> Arc<dyn Step<BenchError>> {
  Arc::new(
    step_fn(name, |input: BenchInput<'_>| -> Result<PipelineData, BenchError> {
      let level = input.data["auth_level"].as_int().unwrap_or_default();
      Ok(input.data.with_entries([("auth_level", Value::Str(level.to_string()))]))
    })
    .with_schema(PayloadSchema::new().require("auth_level", ValueKind::Int)),
  )
}

fn bench_context() -> BenchContext {
  BenchContext {
    tags: (0..16).map(|i| format!("tag_{}", i)).collect(),
  }
}

// --- Benchmark Functions ---

fn bench_pipeline_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("PipelineRun");

  for num_steps in [1usize, 5, 10, 50].iter() {
    let steps: Vec<_> = (0..*num_steps).map(|i| increment_step(format!("step_{}", i))).collect();
    let pipeline = Pipeline::<BenchEvent, BenchContext, BenchError>::builder()
      .steps(steps)
      .build(BenchEvent::default(), &bench_context())
      .unwrap();

    group.throughput(Throughput::Elements(*num_steps as u64));
    group.bench_with_input(BenchmarkId::new("increment", num_steps), num_steps, |b, _| {
      b.iter_batched(
        || pipeline_data! { "counter" => 0 },
        |data| pipeline.run(data).unwrap(),
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_schema_coercion(c: &mut Criterion) {
  let mut group = c.benchmark_group("SchemaCoercion");

  for num_steps in [1usize, 10].iter() {
    let steps: Vec<_> = (0..*num_steps).map(|i| coercing_step(format!("step_{}", i))).collect();
    let pipeline = Pipeline::<BenchEvent, BenchContext, BenchError>::builder()
      .steps(steps)
      .build(BenchEvent::default(), &bench_context())
      .unwrap();

    group.bench_with_input(BenchmarkId::new("numeric_string", num_steps), num_steps, |b, _| {
      b.iter_batched(
        || pipeline_data! { "auth_level" => "2" },
        |data| pipeline.run(data).unwrap(),
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_pipeline_construction(c: &mut Criterion) {
  let mut group = c.benchmark_group("PipelineConstruction");

  for num_steps in [1usize, 10, 50].iter() {
    let steps: Vec<_> = (0..*num_steps).map(|i| increment_step(format!("step_{}", i))).collect();
    group.bench_with_input(BenchmarkId::new("construct", num_steps), num_steps, |b, _| {
      b.iter(|| {
        Pipeline::<BenchEvent, BenchContext, BenchError>::builder()
          .steps(steps.iter().cloned())
          .build(BenchEvent::default(), &bench_context())
          .unwrap()
      })
    });
  }
  group.finish();
}

fn bench_frozen_map(c: &mut Criterion) {
  let mut group = c.benchmark_group("FrozenMap");

  for size in [10usize, 100, 1000].iter() {
    let map: FrozenMap<String, i64> = (0..*size as i64).map(|i| (format!("key_{}", i), i)).collect();

    group.bench_with_input(BenchmarkId::new("fingerprint_uncached", size), size, |b, _| {
      b.iter_batched(
        || map.snapshot().into(),
        |fresh: FrozenMap<String, i64>| criterion::black_box(fresh.fingerprint()),
        criterion::BatchSize::SmallInput,
      );
    });

    group.bench_with_input(BenchmarkId::new("fingerprint_cached", size), size, |b, _| {
      map.fingerprint();
      b.iter(|| criterion::black_box(map.fingerprint()));
    });

    group.bench_with_input(BenchmarkId::new("with_entries", size), size, |b, _| {
      b.iter(|| criterion::black_box(map.with_entries([("extra".to_string(), -1)])));
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_pipeline_run,
  bench_schema_coercion,
  bench_pipeline_construction,
  bench_frozen_map
);
criterion_main!(benches);
