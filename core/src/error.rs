// hookline/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::core::context::Stage;

#[derive(Debug, Error)]
pub enum HookError {
  /// Build time: no built-in or custom constructor is bound to the name.
  #[error("Step not found: '{step_name}' (stage: {stage})")]
  StepNotFound { step_name: String, stage: Stage },

  /// Build time: the constructor rejected the entry's options.
  #[error("Step '{step_name}' could not be constructed. Source: {source}")]
  StepConstruction {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Invalid match filter for step '{step_name}': {message}")]
  InvalidFilter { step_name: String, message: String },

  #[error("Configuration error at '{location}': {message}")]
  Configuration { location: String, message: String },

  #[error("Unknown stage '{stage}' in hook configuration")]
  UnknownStage { stage: String },

  #[error("Hook configuration could not be parsed: {0}")]
  ConfigParse(String),

  /// Run time: a step returned an error and was not fault-tolerant.
  #[error("Step '{step_name}' failed. Source: {source}")]
  StepFailed {
    step_name: String,
    #[source]
    source: AnyhowError,
  },

  /// Run time: at least one unguarded member of a parallel group failed.
  /// `source` is the first failure in member order.
  #[error("Parallel group failed ({failed} of {total} members). First failure: {source}")]
  ParallelGroupFailed {
    failed: usize,
    total: usize,
    #[source]
    source: Box<HookError>,
  },

  /// Run time: the operation wrapped by `HookTable::run_around` failed
  /// between its before and after stages.
  #[error("Operation '{operation}' failed. Source: {source}")]
  OperationFailed {
    operation: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Internal hookline error: {0}")]
  Internal(String),
}

impl HookError {
  /// True for the variants the builder records instead of installing an entry.
  pub fn is_build_error(&self) -> bool {
    matches!(
      self,
      HookError::StepNotFound { .. }
        | HookError::StepConstruction { .. }
        | HookError::InvalidFilter { .. }
        | HookError::Configuration { .. }
        | HookError::UnknownStage { .. }
    )
  }

  /// Name of the step the error is attributed to, if any.
  pub fn step_name(&self) -> Option<&str> {
    match self {
      HookError::StepNotFound { step_name, .. }
      | HookError::StepConstruction { step_name, .. }
      | HookError::InvalidFilter { step_name, .. }
      | HookError::StepFailed { step_name, .. } => Some(step_name),
      HookError::ParallelGroupFailed { source, .. } => source.step_name(),
      _ => None,
    }
  }
}

impl From<serde_json::Error> for HookError {
  fn from(err: serde_json::Error) -> Self {
    HookError::ConfigParse(err.to_string())
  }
}

impl From<serde_yaml::Error> for HookError {
  fn from(err: serde_yaml::Error) -> Self {
    HookError::ConfigParse(err.to_string())
  }
}

pub type HookResult<T, E = HookError> = std::result::Result<T, E>;
