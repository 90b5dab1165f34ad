// hookline/src/steps/mod.rs

//! Built-in steps, available through [`StepRegistry::with_builtins`](crate::StepRegistry::with_builtins).
//!
//! They only reshape or inspect the current item; format, storage and other
//! domain steps are registered by the application.

mod fields;
mod log;

pub use fields::{RequireStep, SetStep, UnsetStep};
pub use log::LogStep;

use crate::core::step::{constructor, into_step, step_fn, StepConstructor};
use std::collections::HashMap;

pub const NOOP: &str = "noop";
pub const LOG: &str = "log";
pub const SET: &str = "set";
pub const UNSET: &str = "unset";
pub const REQUIRE: &str = "require";

pub fn builtin_constructors() -> HashMap<String, StepConstructor> {
  let mut table: HashMap<String, StepConstructor> = HashMap::new();
  table.insert(NOOP.to_string(), constructor(|_| Ok(step_fn(|_ctx| async { Ok(()) }))));
  table.insert(LOG.to_string(), constructor(|opts| Ok(into_step(LogStep::from_options(opts)?))));
  table.insert(SET.to_string(), constructor(|opts| Ok(into_step(SetStep::from_options(opts)?))));
  table.insert(UNSET.to_string(), constructor(|opts| Ok(into_step(UnsetStep::from_options(opts)?))));
  table.insert(REQUIRE.to_string(), constructor(|opts| Ok(into_step(RequireStep::from_options(opts)?))));
  table
}
