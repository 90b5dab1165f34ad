use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hookline::{constructor, step_fn, ContextData, HookConfig, HookContext, PipelineBuilder, PredicateMatcher, Stage, StepRegistry};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Helpers ---

/// Registry with the built-ins plus a `bump` step that increments `counter`.
fn bench_registry() -> StepRegistry {
  let registry = StepRegistry::with_builtins();
  registry.register(
    "bump",
    constructor(|_| {
      Ok(step_fn(|ctx: ContextData<HookContext>| async move {
        if let Some(Value::Object(item)) = ctx.write().current_item_mut() {
          let next = item.get("counter").and_then(Value::as_u64).unwrap_or(0) + 1;
          item.insert("counter".to_string(), json!(next));
        }
        Ok(())
      }))
    }),
  );
  registry
}

/// `num_steps` sequential `bump` entries, every one guarded by a self-referencing filter.
fn sequential_config(num_steps: usize) -> HookConfig {
  let mut entries = Map::new();
  for i in 0..num_steps {
    entries.insert(
      format!("bump_{}", i),
      json!({ "hook": "bump", "match": { "owner": "$author" } }),
    );
  }
  HookConfig::new().with_stage("before", Value::Object(entries))
}

fn parallel_config(num_members: usize) -> HookConfig {
  let members: Vec<Value> = (0..num_members)
    .map(|i| {
      let mut fields = Map::new();
      fields.insert(format!("field_{}", i), json!("${owner}"));
      json!({ "hook": "set", "fields": fields })
    })
    .collect();
  HookConfig::new().with_stage("before", json!({ "parallel": members }))
}

fn bench_item() -> Value {
  json!({ "owner": "ada", "author": "ada", "counter": 0 })
}

// --- Benchmark Functions ---

fn bench_build(c: &mut Criterion) {
  let mut group = c.benchmark_group("PipelineBuild");
  let registry = bench_registry();

  for num_steps in [1, 10, 50].iter() {
    let config = sequential_config(*num_steps);
    group.throughput(Throughput::Elements(*num_steps as u64));
    group.bench_with_input(BenchmarkId::new("sequential", num_steps), &config, |b, config| {
      b.iter(|| PipelineBuilder::new(&registry).build(config))
    });
  }
  group.finish();
}

fn bench_sequential_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("SequentialRun");
  let rt = Runtime::new().unwrap();
  let registry = bench_registry();

  for num_steps in [1, 10, 50].iter() {
    let output = PipelineBuilder::new(&registry).build(&sequential_config(*num_steps));
    let pipeline = output.pipeline(Stage::Before).cloned().unwrap();

    group.throughput(Throughput::Elements(*num_steps as u64));
    group.bench_with_input(BenchmarkId::new("guarded_steps", num_steps), num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(HookContext::before("create", bench_item())),
        |ctx| {
          let p_clone = Arc::clone(&pipeline);
          async move { p_clone.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_parallel_run(c: &mut Criterion) {
  let mut group = c.benchmark_group("ParallelRun");
  let rt = Runtime::new().unwrap();
  let registry = bench_registry();

  for num_members in [2, 8, 32].iter() {
    let output = PipelineBuilder::new(&registry).build(&parallel_config(*num_members));
    let pipeline = output.pipeline(Stage::Before).cloned().unwrap();

    group.throughput(Throughput::Elements(*num_members as u64));
    group.bench_with_input(BenchmarkId::new("members", num_members), num_members, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(HookContext::before("create", bench_item())),
        |ctx| {
          let p_clone = Arc::clone(&pipeline);
          async move { p_clone.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_predicate(c: &mut Criterion) {
  let mut group = c.benchmark_group("PredicateEvaluation");
  let matcher = PredicateMatcher::new();
  let item = HookContext::before(
    "create",
    json!({ "meta": { "size": 42 }, "limits": { "max": 100 }, "tags": ["a", "b", "c"], "format": "csv" }),
  );

  let default_only = matcher.build_predicate("bench", None).unwrap();
  group.bench_function("default_filter", |b| b.iter(|| default_only(&item)));

  let filter = json!({
    "meta.size": { "$lt": "$limits.max" },
    "$or": [ { "format": { "$in": ["csv", "tsv"] } }, { "tags": { "$size": 0 } } ],
    "tags": { "$all": ["a", "c"] },
  });
  let templated = matcher.build_predicate("bench", Some(&filter)).unwrap();
  group.bench_function("templated_filter", |b| b.iter(|| templated(&item)));
  group.finish();
}

criterion_group!(benches, bench_build, bench_sequential_run, bench_parallel_run, bench_predicate);
criterion_main!(benches);
