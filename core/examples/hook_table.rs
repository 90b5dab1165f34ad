// hookline/examples/hook_table.rs

use async_trait::async_trait;
use hookline::{
  into_step, ContextData, HookConfig, HookContext, HookError, HookStep, HookTable, PipelineBuilder, StepOptions,
  StepRegistry,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Converts a numeric field between units. A struct-based step with typed options.
#[derive(Deserialize)]
struct ConvertUnits {
  field: String,
  factor: f64,
}

#[async_trait]
impl HookStep for ConvertUnits {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()> {
    let mut guard = ctx.write();
    let Some(Value::Object(item)) = guard.current_item_mut() else {
      anyhow::bail!("no item to convert");
    };
    let Some(value) = item.get(&self.field).and_then(Value::as_f64) else {
      anyhow::bail!("field '{}' is not a number", self.field);
    };
    item.insert(self.field.clone(), json!(value * self.factor));
    Ok(())
  }
}

#[tokio::main]
async fn main() -> Result<(), HookError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Hook Table Example ---");

  let registry = StepRegistry::with_builtins();
  registry.register(
    "convert_units",
    hookline::constructor(|opts: &StepOptions| Ok(into_step(opts.deserialize::<ConvertUnits>()?))),
  );

  let config = HookConfig::from_json_str(
    r#"{
      "before": {
        "convert_units": { "field": "weight", "factor": 1000, "match": { "unit": "kg" } },
        "set": { "fields": { "unit": "g" }, "match": { "unit": "kg" } }
      },
      "after": {
        "unset": { "fields": ["internal"] },
        "missing_audit_step": true
      }
    }"#,
  )?;

  let mut table = HookTable::new();
  let output = PipelineBuilder::new(&registry)
    .for_operation("create")
    .build_into(&config, &mut table);
  for err in &output.errors {
    warn!("Configuration problem: {}", err);
  }

  for item in [json!({ "weight": 2.5, "unit": "kg" }), json!({ "weight": 300, "unit": "g" })] {
    let ctx = ContextData::new(HookContext::before("create", item));
    let ctx = table
      .run_around("create", ctx, |ctx| async move {
        // The stored record echoes the input with a storage-only field.
        let mut stored = ctx.read().data.clone().unwrap_or_default();
        if let Value::Object(map) = &mut stored {
          map.insert("internal".to_string(), json!("shard-7"));
        }
        Ok(stored)
      })
      .await?;
    info!("Stored and returned: {}", ctx.read().result.data.clone().unwrap_or_default());
  }

  info!("--- Hook Table Example Finished ---");
  Ok(())
}
