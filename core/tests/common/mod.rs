// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use anyhow::anyhow;
use hookline::{constructor, step_fn, ContextData, HookConfig, HookContext, StepConstructor, StepRegistry};
use serde_json::{json, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use std::time::Duration;
use tracing::Level;

// --- Test step names ---
pub const RECORD: &str = "record";
pub const FAIL: &str = "fail";
pub const SLOW_RECORD: &str = "slow_record";
pub const REJECT_OPTIONS: &str = "reject_options";
pub const SLOW_FAIL: &str = "slow_fail";
pub const PANIC: &str = "panic";

/// Param under which test steps append their labels, in execution order.
pub const TRACE_PARAM: &str = "trace";

pub fn record(ctx: &ContextData<HookContext>, label: &str) {
  let mut guard = ctx.write();
  let trace = guard.params.entry(TRACE_PARAM).or_insert_with(|| json!([]));
  if let Value::Array(items) = trace {
    items.push(json!(label));
  }
}

pub fn trace_of(ctx: &ContextData<HookContext>) -> Vec<String> {
  ctx
    .map_read(|c| &c.params)
    .get(TRACE_PARAM)
    .and_then(Value::as_array)
    .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
    .unwrap_or_default()
}

// --- Common Step Constructors ---

/// Appends its `label` option (or the step name) to the trace.
pub fn record_ctor() -> StepConstructor {
  constructor(|opts| {
    let label = opts.get_str("label").unwrap_or(RECORD).to_string();
    Ok(step_fn(move |ctx| {
      let label = label.clone();
      async move {
        STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
        record(&ctx, &label);
        Ok(())
      }
    }))
  })
}

/// Writes `dirty: true` onto the current item and the trace, then fails.
pub fn fail_ctor() -> StepConstructor {
  constructor(|opts| {
    let label = opts.get_str("label").unwrap_or(FAIL).to_string();
    Ok(step_fn(move |ctx| {
      let label = label.clone();
      async move {
        STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
        record(&ctx, &label);
        if let Some(Value::Object(item)) = ctx.write().current_item_mut() {
          item.insert("dirty".to_string(), json!(true));
        }
        Err(anyhow!("step failure from '{}'", label))
      }
    }))
  })
}

/// Sleeps `delay_ms`, then records its label.
pub fn slow_record_ctor() -> StepConstructor {
  constructor(|opts| {
    let label = opts.get_str("label").unwrap_or(SLOW_RECORD).to_string();
    let delay = opts.get("delay_ms").and_then(Value::as_u64).unwrap_or(10);
    Ok(step_fn(move |ctx| {
      let label = label.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
        record(&ctx, &label);
        Ok(())
      }
    }))
  })
}

/// Sleeps `delay_ms`, writes `dirty: true` onto the current item, then fails.
pub fn slow_fail_ctor() -> StepConstructor {
  constructor(|opts| {
    let delay = opts.get("delay_ms").and_then(Value::as_u64).unwrap_or(50);
    Ok(step_fn(move |ctx| async move {
      tokio::time::sleep(Duration::from_millis(delay)).await;
      STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
      if let Some(Value::Object(item)) = ctx.write().current_item_mut() {
        item.insert("dirty".to_string(), json!(true));
      }
      Err(anyhow!("slow failure after {}ms", delay))
    }))
  })
}

/// Records `panic`, then panics.
pub fn panic_ctor() -> StepConstructor {
  constructor(|_opts| {
    Ok(step_fn(|ctx| async move {
      record(&ctx, PANIC);
      if ctx.read().params.contains_key(TRACE_PARAM) {
        panic!("step blew up");
      }
      Ok(())
    }))
  })
}

/// Constructor that always refuses its options.
pub fn reject_options_ctor() -> StepConstructor {
  constructor(|_opts| Err(anyhow!("options rejected")))
}

/// Built-ins plus every test step.
pub fn test_registry() -> StepRegistry {
  let registry = StepRegistry::with_builtins();
  registry.register(RECORD, record_ctor());
  registry.register(FAIL, fail_ctor());
  registry.register(SLOW_RECORD, slow_record_ctor());
  registry.register(REJECT_OPTIONS, reject_options_ctor());
  registry.register(SLOW_FAIL, slow_fail_ctor());
  registry.register(PANIC, panic_ctor());
  registry
}

// --- Context and Config Helpers ---

pub fn before_ctx(data: Value) -> ContextData<HookContext> {
  ContextData::new(HookContext::before("create", data))
}

pub fn after_ctx(result_data: Value) -> ContextData<HookContext> {
  ContextData::new(HookContext::after("create", result_data))
}

pub fn config(value: Value) -> HookConfig {
  HookConfig::from_value(value).expect("test config must be an object")
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::TRACE)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn executed_steps() -> usize {
  STEP_EXEC_COUNTER.load(Ordering::SeqCst)
}
