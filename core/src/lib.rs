// src/lib.rs

//! Hookline: declarative before/after hook pipelines for Rust services.
//!
//! A service describes, per stage, an ordered list of named steps in a
//! configuration document. Hookline resolves the names against a
//! [`StepRegistry`], wraps each step with its match filter and optional fault
//! tolerance, and produces one [`Pipeline`] per stage:
//!  - Steps run strictly in declared order.
//!  - A `parallel` entry runs its members concurrently on the same context.
//!  - Each step is guarded by a query filter over the current item whose
//!    operands may refer back to the item's own fields (`"$field"`).
//!  - `faultTolerant` steps log their failure and leave the context as it was.
//!  - Bad entries are reported, not fatal: the rest of the stage still builds.

pub mod conditional;
pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod registry;
pub mod steps;

// --- Re-exports for the Public API ---

pub use crate::core::context::{HookContext, ResultContainer, Stage};
pub use crate::core::context_data::ContextData;
pub use crate::core::options::StepOptions;
pub use crate::core::step::{constructor, into_step, step_fn, Hook, HookStep, Step, StepConstructor};

pub use crate::conditional::matcher::{Predicate, PredicateMatcher};
pub use crate::config::HookConfig;

pub use crate::pipeline::builder::{BuildOutput, PipelineBuilder};
pub use crate::pipeline::definition::Pipeline;

pub use crate::host::{HookHost, HookTable};
pub use crate::registry::StepRegistry;

pub use crate::error::{HookError, HookResult};

/*
    Typical use:
    1. Create a `StepRegistry` (usually `StepRegistry::with_builtins()`) and
       `register` the application's own step constructors.
    2. Load a `HookConfig` from JSON or YAML.
    3. `PipelineBuilder::new(&registry).for_operation("create").build_into(&config, &mut table)`
       and inspect `BuildOutput::errors`.
    4. Per item, wrap a `HookContext` in `ContextData` and call
       `table.run_around("create", ctx, |ctx| async move { ... })`.
*/
