// hookline/src/pipeline/combinators.rs

//! Wrappers that turn a constructed [`Step`] into the [`Hook`] a pipeline stores.
//!
//! The builder composes them as `guarded(fault_tolerant?(named(step)))`:
//! the guard decides whether the step runs at all, the fault-tolerant layer
//! contains its failure, and `named` attaches the step name to its error.

use crate::conditional::matcher::Predicate;
use crate::core::context::HookContext;
use crate::core::context_data::ContextData;
use crate::core::step::{Hook, Step};
use crate::error::{HookError, HookResult};
use anyhow::anyhow;
use futures_util::future::join_all;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{event, Level};

/// Runs `step` and reports its failure as [`HookError::StepFailed`].
pub fn named(step_name: impl Into<String>, step: Step) -> Hook {
  let step_name: Arc<str> = Arc::from(step_name.into());
  Arc::new(move |ctx: ContextData<HookContext>| {
    let step_name = step_name.clone();
    let fut = step(ctx);
    Box::pin(async move {
      fut.await.map_err(|source| HookError::StepFailed {
        step_name: step_name.to_string(),
        source,
      })
    })
  })
}

/// Contains any failure of `hook`, panics included.
///
/// The hook runs against a private copy of the context. If it succeeds, only
/// the fields it changed are applied onto the shared context; if it fails or
/// panics, the copy is dropped and the failure is logged. Either way the call
/// reports success, so the rest of the pipeline runs as if a failed step had
/// not been configured. Writes made meanwhile by parallel siblings survive.
pub fn fault_tolerant(step_name: impl Into<String>, hook: Hook) -> Hook {
  let step_name: Arc<str> = Arc::from(step_name.into());
  Arc::new(move |ctx: ContextData<HookContext>| {
    let step_name = step_name.clone();
    let hook = hook.clone();
    Box::pin(async move {
      let base = ctx.snapshot();
      let scratch = ContextData::new(base.clone());

      let outcome = match AssertUnwindSafe(async { hook(scratch.clone()).await }).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(HookError::StepFailed {
          step_name: step_name.to_string(),
          source: anyhow!("step panicked: {}", panic_message(&*payload)),
        }),
      };

      match outcome {
        Ok(()) => {
          let changed = scratch.snapshot();
          ctx.write().apply_changes(&base, &changed);
          Ok(())
        }
        Err(e) => {
          event!(Level::WARN, step_name = %step_name, error = %e, "Fault-tolerant step failed; its changes were discarded.");
          Ok(())
        }
      }
    })
  })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    message.to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

/// Runs `hook` only when `predicate` accepts the context; otherwise the
/// context is left untouched and the call succeeds.
pub fn guarded(step_name: impl Into<String>, predicate: Predicate, hook: Hook) -> Hook {
  let step_name: Arc<str> = Arc::from(step_name.into());
  Arc::new(move |ctx: ContextData<HookContext>| {
    let step_name = step_name.clone();
    let predicate = predicate.clone();
    let hook = hook.clone();
    Box::pin(async move {
      let should_run = predicate(&*ctx.read());
      if !should_run {
        event!(Level::DEBUG, step_name = %step_name, "Step skipped by its match filter.");
        return Ok(());
      }
      hook(ctx).await
    })
  })
}

/// Steps started together against one shared context.
///
/// `run` starts every member, waits for all of them to settle (a failing
/// member does not cancel its siblings) and fails if any member failed. The
/// members mutate the same context with no ordering between them.
pub struct ParallelGroup {
  members: Vec<(String, Hook)>,
}

impl ParallelGroup {
  pub fn new(members: Vec<(String, Hook)>) -> Self {
    Self { members }
  }

  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  pub fn member_names(&self) -> Vec<String> {
    self.members.iter().map(|(name, _)| name.clone()).collect()
  }

  pub async fn run(&self, ctx: ContextData<HookContext>) -> HookResult<()> {
    let total = self.members.len();
    event!(Level::DEBUG, total, "Parallel group fanning out.");

    let results = join_all(self.members.iter().map(|(_, hook)| hook(ctx.clone()))).await;

    let mut failed = 0;
    let mut first_failure = None;
    for ((name, _), result) in self.members.iter().zip(results) {
      if let Err(e) = result {
        event!(Level::ERROR, step_name = %name, error = %e, "Parallel member failed.");
        failed += 1;
        first_failure.get_or_insert(e);
      }
    }

    match first_failure {
      None => {
        event!(Level::DEBUG, total, "Parallel group settled.");
        Ok(())
      }
      Some(source) => Err(HookError::ParallelGroupFailed {
        failed,
        total,
        source: Box::new(source),
      }),
    }
  }

  pub fn into_hook(self) -> Hook {
    let group = Arc::new(self);
    Arc::new(move |ctx: ContextData<HookContext>| {
      let group = group.clone();
      Box::pin(async move { group.run(ctx).await })
    })
  }
}
