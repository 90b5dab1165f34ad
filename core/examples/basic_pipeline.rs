// hookline/examples/basic_pipeline.rs

use hookline::{ContextData, HookConfig, HookContext, HookError, PipelineBuilder, Stage, StepRegistry};
use serde_json::json;
use tracing::info;

const CONFIG: &str = r#"
before:
  require:
    fields: [title]
  set:
    fields:
      slug: "${title}-draft"
      status: draft
  log:
    message: "document prepared"
after:
  log:
    message: "document stored"
"#;

#[tokio::main]
async fn main() -> Result<(), HookError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. A registry with the built-in steps.
  let registry = StepRegistry::with_builtins();

  // 2. Load the configuration. Keys run in the order they are written.
  let config = HookConfig::from_yaml_str(CONFIG)?;

  // 3. Build one pipeline per stage.
  let output = PipelineBuilder::new(&registry).build(&config);
  for err in &output.errors {
    info!("Build problem: {}", err);
  }

  // 4. Run the before pipeline on one item.
  if let Some(before) = output.pipeline(Stage::Before) {
    let ctx = ContextData::new(HookContext::before("create", json!({ "title": "release-notes" })));
    let ctx = before.run(ctx).await?;
    info!("Item after 'before': {}", ctx.read().data.clone().unwrap_or_default());
  }

  // 5. Items marked with a truthy `skip` pass through untouched.
  if let Some(before) = output.pipeline(Stage::Before) {
    let ctx = ContextData::new(HookContext::before("create", json!({ "skip": true })));
    let ctx = before.run(ctx).await?;
    info!("Skipped item: {}", ctx.read().data.clone().unwrap_or_default());
  }

  info!("--- Basic Pipeline Example Finished ---");
  Ok(())
}
