// hookline/src/steps/log.rs

use crate::core::context::HookContext;
use crate::core::context_data::ContextData;
use crate::core::options::StepOptions;
use crate::core::step::HookStep;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{event, Level};

/// Emits the stage, operation and current item at `INFO`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogStep {
  #[serde(default)]
  pub message: Option<String>,
}

impl LogStep {
  pub fn from_options(opts: &StepOptions) -> anyhow::Result<Self> {
    opts.deserialize()
  }
}

#[async_trait]
impl HookStep for LogStep {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()> {
    let (stage, operation, item) = {
      let guard = ctx.read();
      let item = guard.current_item().map(|v| v.to_string()).unwrap_or_default();
      (guard.stage, guard.operation.clone(), item)
    };
    event!(
      Level::INFO,
      stage = %stage,
      operation = %operation,
      item = %item,
      "{}",
      self.message.as_deref().unwrap_or("hook context")
    );
    Ok(())
  }
}
