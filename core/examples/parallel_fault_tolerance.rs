// hookline/examples/parallel_fault_tolerance.rs

use anyhow::anyhow;
use hookline::{constructor, step_fn, ContextData, HookConfig, HookContext, HookError, PipelineBuilder, Stage, StepRegistry};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

/// Simulates slow work, then writes `output` into `field`.
fn slow_writer() -> hookline::StepConstructor {
  constructor(|opts| {
    let field = opts.get_str("field").ok_or_else(|| anyhow!("'field' option is required"))?.to_string();
    let output = opts.get("output").cloned().unwrap_or(Value::Bool(true));
    Ok(step_fn(move |ctx: ContextData<HookContext>| {
      let field = field.clone();
      let output = output.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if let Some(Value::Object(item)) = ctx.write().current_item_mut() {
          item.insert(field, output);
        }
        Ok(())
      }
    }))
  })
}

#[tokio::main]
async fn main() -> Result<(), HookError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Parallel + Fault Tolerance Example ---");

  let registry = StepRegistry::with_builtins();
  registry.register("slow_writer", slow_writer());
  registry.register(
    "flaky_thumbnail",
    constructor(|_| Ok(step_fn(|_ctx| async { Err(anyhow!("thumbnail service unavailable")) }))),
  );

  let config = HookConfig::from_value(json!({
    "before": {
      "parallel": [
        { "hook": "slow_writer", "field": "checksum", "output": "9f2c" },
        { "hook": "slow_writer", "field": "virus_scan", "output": "clean" },
        { "hook": "flaky_thumbnail", "faultTolerant": true },
      ],
      "require": { "fields": ["checksum", "virus_scan"] },
    }
  }))?;

  let output = PipelineBuilder::new(&registry).build(&config);
  let Some(before) = output.pipeline(Stage::Before) else {
    return Err(HookError::Internal("before pipeline was not built".to_string()));
  };

  let ctx = ContextData::new(HookContext::before("create", json!({ "name": "photo.jpg" })));
  let ctx = before.run(ctx).await?;
  info!(
    "Upload ready despite the failed thumbnail: {}",
    ctx.read().data.clone().unwrap_or_default()
  );

  info!("--- Parallel + Fault Tolerance Example Finished ---");
  Ok(())
}
