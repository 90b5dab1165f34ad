// hookline/src/host.rs

//! Defines the `HookHost` seam pipelines are installed on, and `HookTable`,
//! a host that keeps pipelines keyed by stage and operation kind and runs them
//! around an operation.

use crate::core::context::{HookContext, Stage};
use crate::core::context_data::ContextData;
use crate::error::{HookError, HookResult};
use crate::pipeline::definition::Pipeline;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Something that accepts built stage pipelines.
pub trait HookHost {
  fn install(&mut self, stage: Stage, operation: &str, pipeline: Arc<Pipeline>);
}

/// Pipelines keyed by `(stage, operation)`.
#[derive(Debug, Default)]
pub struct HookTable {
  pipelines: HashMap<(Stage, String), Arc<Pipeline>>,
}

impl HookHost for HookTable {
  fn install(&mut self, stage: Stage, operation: &str, pipeline: Arc<Pipeline>) {
    let replaced = self
      .pipelines
      .insert((stage, operation.to_string()), pipeline)
      .is_some();
    event!(Level::DEBUG, %stage, operation, replaced, "Pipeline installed.");
  }
}

impl HookTable {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, stage: Stage, operation: &str) -> Option<&Arc<Pipeline>> {
    self.pipelines.get(&(stage, operation.to_string()))
  }

  pub fn len(&self) -> usize {
    self.pipelines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipelines.is_empty()
  }

  /// Runs the pipeline installed for `(stage, operation)`.
  ///
  /// The context's stage marker is set to `stage` first. With nothing
  /// installed the context is handed back unchanged.
  #[instrument(name = "HookTable::run", skip(self, ctx), err(Display))]
  pub async fn run(
    &self,
    stage: Stage,
    operation: &str,
    ctx: ContextData<HookContext>,
  ) -> HookResult<ContextData<HookContext>> {
    ctx.write().stage = stage;
    match self.get(stage, operation) {
      Some(pipeline) => pipeline.run(ctx).await,
      None => {
        event!(Level::TRACE, "No pipeline installed; passing context through.");
        Ok(ctx)
      }
    }
  }

  /// Runs `before`, then `body`, then `after` for one item.
  ///
  /// `body` receives the context after the before stage and returns the
  /// operation's result, which becomes `result.data` for the after stage. A
  /// failing stage or body stops the sequence.
  #[instrument(name = "HookTable::run_around", skip(self, ctx, body), err(Display))]
  pub async fn run_around<F, Fut>(
    &self,
    operation: &str,
    ctx: ContextData<HookContext>,
    body: F,
  ) -> HookResult<ContextData<HookContext>>
  where
    F: FnOnce(ContextData<HookContext>) -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
  {
    let ctx = self.run(Stage::Before, operation, ctx).await?;

    let result = body(ctx.clone()).await.map_err(|source| HookError::OperationFailed {
      operation: operation.to_string(),
      source,
    })?;
    ctx.write().result.data = Some(result);

    self.run(Stage::After, operation, ctx).await
  }
}
