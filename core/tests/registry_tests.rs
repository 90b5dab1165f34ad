// tests/registry_tests.rs
mod common;

use common::*;
use hookline::steps::{LOG, NOOP, REQUIRE, SET, UNSET};
use hookline::{constructor, step_fn, HookError, PipelineBuilder, Stage, StepRegistry};
use serde_json::json;
use serial_test::serial;

#[test]
fn test_registry_layers() {
  let empty = StepRegistry::new();
  assert!(empty.builtin_names().is_empty());
  assert!(empty.lookup(NOOP).is_none());

  let registry = StepRegistry::with_builtins();
  assert_eq!(registry.builtin_names(), vec![LOG, NOOP, REQUIRE, SET, UNSET]);
  assert!(registry.custom_names().is_empty());
  for name in [NOOP, LOG, SET, UNSET, REQUIRE] {
    assert!(registry.contains(name), "built-in '{}' missing", name);
  }
}

#[tokio::test]
#[serial]
async fn test_register_then_unregister_lifecycle() {
  setup_tracing();
  let registry = StepRegistry::with_builtins();
  let cfg = config(json!({ "before": { "record": { "label": "custom" } } }));

  // Not yet registered.
  let output = PipelineBuilder::new(&registry).build(&cfg);
  assert!(matches!(&output.errors[..], [HookError::StepNotFound { step_name, .. }] if step_name == "record"));

  registry.register(RECORD, record_ctor());
  assert!(registry.contains(RECORD));
  assert_eq!(registry.custom_names(), vec![RECORD]);
  let output = PipelineBuilder::new(&registry).build(&cfg);
  assert!(output.is_clean());
  let ctx = output.pipeline(Stage::Before).unwrap().run(before_ctx(json!({}))).await.unwrap();
  assert_eq!(trace_of(&ctx), vec!["custom"]);

  assert!(registry.unregister(RECORD));
  assert!(!registry.unregister(RECORD), "second unregister is a no-op");
  let output = PipelineBuilder::new(&registry).build(&cfg);
  assert!(matches!(&output.errors[..], [HookError::StepNotFound { step_name, .. }] if step_name == "record"));
}

#[tokio::test]
#[serial]
async fn test_register_overwrites_previous_binding() {
  setup_tracing();
  let registry = StepRegistry::new();
  registry.register(
    "mark",
    constructor(|_| {
      Ok(step_fn(|ctx| async move {
        record(&ctx, "v1");
        Ok(())
      }))
    }),
  );
  registry.register(
    "mark",
    constructor(|_| {
      Ok(step_fn(|ctx| async move {
        record(&ctx, "v2");
        Ok(())
      }))
    }),
  );
  assert_eq!(registry.custom_names(), vec!["mark"]);

  let output = PipelineBuilder::new(&registry).build(&config(json!({ "before": { "mark": true } })));
  let ctx = output.pipeline(Stage::Before).unwrap().run(before_ctx(json!({}))).await.unwrap();
  assert_eq!(trace_of(&ctx), vec!["v2"]);
}

#[tokio::test]
#[serial]
async fn test_builtin_shadows_custom_binding() {
  setup_tracing();
  let registry = StepRegistry::with_builtins();
  registry.register(
    NOOP,
    constructor(|_| {
      Ok(step_fn(|ctx| async move {
        record(&ctx, "custom noop");
        Ok(())
      }))
    }),
  );
  assert!(registry.custom_names().contains(&NOOP.to_string()));

  let output = PipelineBuilder::new(&registry).build(&config(json!({ "before": { "noop": null } })));
  let ctx = output.pipeline(Stage::Before).unwrap().run(before_ctx(json!({}))).await.unwrap();
  assert!(trace_of(&ctx).is_empty(), "built-in noop resolves first");
}

#[tokio::test]
#[serial]
async fn test_registered_pipeline_survives_unregister() {
  setup_tracing();
  let registry = test_registry();
  let output = PipelineBuilder::new(&registry).build(&config(json!({ "before": { "record": true } })));
  registry.unregister(RECORD);

  // Constructed steps are owned by the pipeline.
  let ctx = output.pipeline(Stage::Before).unwrap().run(before_ctx(json!({}))).await.unwrap();
  assert_eq!(trace_of(&ctx), vec![RECORD]);
}
