// hookline/src/pipeline/execution.rs

//! Contains `Pipeline::run()`, which threads one context through the entries
//! of a stage pipeline.

use crate::core::context::HookContext;
use crate::core::context_data::ContextData;
use crate::error::HookResult;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, span, Instrument, Level};

impl Pipeline {
  /// Runs every entry against `ctx`, strictly in declaration order.
  ///
  /// Returns the same context handle once all entries have completed. The
  /// first entry that fails aborts the run: later entries do not execute and
  /// the error is returned. Skipped and fault-tolerant entries never fail.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      stage = %self.stage,
      operation = %self.operation,
      num_entries = self.entries.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx: ContextData<HookContext>) -> HookResult<ContextData<HookContext>> {
    let ctx_stage = ctx.read().stage;
    if ctx_stage != self.stage {
      event!(Level::WARN, context_stage = %ctx_stage, "Context stage marker differs from the pipeline's stage.");
    }
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (entry_idx, entry) in self.entries.iter().enumerate() {
      let entry_span = span!(
        Level::INFO,
        "pipeline_entry",
        entry_key = entry.key.as_str(),
        entry_index = entry_idx,
        parallel = entry.is_parallel()
      );

      if let Err(e) = (entry.hook)(ctx.clone()).instrument(entry_span).await {
        event!(Level::ERROR, entry_key = %entry.key, entry_index = entry_idx, error = %e, "Entry failed; stage aborted.");
        return Err(e);
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(ctx)
  }
}
