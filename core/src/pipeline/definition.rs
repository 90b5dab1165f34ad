// hookline/src/pipeline/definition.rs

//! Contains the `Pipeline` struct: the ordered, immutable list of wrapped
//! entries produced for one stage.

use crate::core::context::Stage;
use crate::core::step::Hook;
use crate::pipeline::combinators::ParallelGroup;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
  /// A single step, with the registry name it was resolved from.
  Step { step_name: String },
  /// A parallel group, with its members' step names in declaration order.
  Parallel { members: Vec<String> },
}

pub struct PipelineEntry {
  pub(crate) key: String,
  pub(crate) kind: EntryKind,
  pub(crate) hook: Hook,
}

impl PipelineEntry {
  pub fn step(key: impl Into<String>, step_name: impl Into<String>, hook: Hook) -> Self {
    Self {
      key: key.into(),
      kind: EntryKind::Step {
        step_name: step_name.into(),
      },
      hook,
    }
  }

  pub fn parallel(key: impl Into<String>, group: ParallelGroup) -> Self {
    Self {
      key: key.into(),
      kind: EntryKind::Parallel {
        members: group.member_names(),
      },
      hook: group.into_hook(),
    }
  }

  /// The configuration key the entry was declared under.
  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn kind(&self) -> &EntryKind {
    &self.kind
  }

  pub fn is_parallel(&self) -> bool {
    matches!(self.kind, EntryKind::Parallel { .. })
  }
}

impl fmt::Debug for PipelineEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PipelineEntry")
      .field("key", &self.key)
      .field("kind", &self.kind)
      .finish()
  }
}

/// The executable pipeline of one stage, handling one operation kind.
///
/// Built once by [`PipelineBuilder`](crate::PipelineBuilder) and shared
/// read-only afterwards; there is no API to change its entries.
pub struct Pipeline {
  pub(crate) stage: Stage,
  pub(crate) operation: String,
  pub(crate) entries: Vec<PipelineEntry>,
}

impl Pipeline {
  /// Creates a pipeline from already wrapped entries.
  pub fn from_entries(stage: Stage, operation: impl Into<String>, entries: Vec<PipelineEntry>) -> Self {
    Self {
      stage,
      operation: operation.into(),
      entries,
    }
  }

  pub fn stage(&self) -> Stage {
    self.stage
  }

  pub fn operation(&self) -> &str {
    &self.operation
  }

  pub fn entries(&self) -> &[PipelineEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn keys(&self) -> Vec<&str> {
    self.entries.iter().map(PipelineEntry::key).collect()
  }
}

impl fmt::Debug for Pipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Pipeline")
      .field("stage", &self.stage)
      .field("operation", &self.operation)
      .field("entries", &self.entries)
      .finish()
  }
}
