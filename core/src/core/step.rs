// hookline/src/core/step.rs

//! The step contract: what every step implementation must provide, and the
//! engine-side wrapped form (`Hook`) the pipeline actually stores.

use crate::core::context::HookContext;
use crate::core::context_data::ContextData;
use crate::core::options::StepOptions;
use crate::error::HookResult;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type StepFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A constructed step.
///
/// A step receives a clone of the context handle, mutates it in place and
/// signals failure by returning `Err`. Lock guards taken on the context must
/// be dropped before the step awaits anything.
pub type Step = Arc<dyn Fn(ContextData<HookContext>) -> StepFuture + Send + Sync + 'static>;

/// Builds a step from the options of one configuration entry.
///
/// A constructor may reject its options; the builder records that as a
/// build error for the entry and carries on.
pub type StepConstructor = Arc<dyn Fn(&StepOptions) -> anyhow::Result<Step> + Send + Sync + 'static>;

pub type HookFuture = Pin<Box<dyn Future<Output = HookResult<()>> + Send>>;

/// A step after the builder has attached its name, fault policy and guard.
/// Failures are already `HookError`s.
pub type Hook = Arc<dyn Fn(ContextData<HookContext>) -> HookFuture + Send + Sync + 'static>;

/// Struct-based alternative to closures, for steps that carry their own state.
#[async_trait]
pub trait HookStep: Send + Sync + 'static {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()>;
}

/// Turns an async closure into a [`Step`].
pub fn step_fn<F, Fut>(f: F) -> Step
where
  F: Fn(ContextData<HookContext>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Turns a [`HookStep`] implementation into a [`Step`].
pub fn into_step<S: HookStep>(step: S) -> Step {
  let step = Arc::new(step);
  Arc::new(move |ctx| {
    let step = step.clone();
    Box::pin(async move { step.call(ctx).await })
  })
}

/// Wraps a constructor closure into a [`StepConstructor`].
pub fn constructor<F>(f: F) -> StepConstructor
where
  F: Fn(&StepOptions) -> anyhow::Result<Step> + Send + Sync + 'static,
{
  Arc::new(f)
}
