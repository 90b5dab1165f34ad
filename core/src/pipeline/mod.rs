// hookline/src/pipeline/mod.rs

//! Stage pipelines: how they are built from configuration, how their entries
//! are wrapped, and how they run.

pub mod builder;
pub mod combinators;
pub mod definition;
pub mod execution;

pub use builder::{BuildOutput, PipelineBuilder, DEFAULT_OPERATION};
pub use combinators::ParallelGroup;
pub use definition::{EntryKind, Pipeline, PipelineEntry};
