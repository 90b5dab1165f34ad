pub mod context;
pub mod context_data;
pub mod options;
pub mod step;

pub use context::{HookContext, ResultContainer, Stage};
pub use context_data::ContextData;
pub use options::StepOptions;
pub use step::{constructor, into_step, step_fn, Hook, HookStep, Step, StepConstructor};
