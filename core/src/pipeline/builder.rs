// hookline/src/pipeline/builder.rs

//! Contains `PipelineBuilder`, which turns a [`HookConfig`] into one
//! [`Pipeline`] per stage.
//!
//! Building is lenient. An entry that cannot be built is recorded in
//! [`BuildOutput::errors`], logged and left out; the rest of the stage is
//! still built, so a configuration with one bad entry yields every other
//! entry in its declared position.

use crate::conditional::matcher::PredicateMatcher;
use crate::config::{HookConfig, ParallelGroupDefinition, StepDefinition, PARALLEL_KEY};
use crate::core::context::Stage;
use crate::core::step::Hook;
use crate::error::HookError;
use crate::host::HookHost;
use crate::pipeline::combinators::{fault_tolerant, guarded, named, ParallelGroup};
use crate::pipeline::definition::{Pipeline, PipelineEntry};
use crate::registry::StepRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// Operation kind pipelines handle unless [`PipelineBuilder::for_operation`] says otherwise.
pub const DEFAULT_OPERATION: &str = "create";

pub struct PipelineBuilder<'r> {
  registry: &'r StepRegistry,
  matcher: PredicateMatcher,
  operation: String,
}

/// Result of a build: the pipelines that could be built and every entry-level
/// problem found on the way.
#[derive(Debug, Default)]
pub struct BuildOutput {
  pub pipelines: BTreeMap<Stage, Arc<Pipeline>>,
  pub errors: Vec<HookError>,
}

impl BuildOutput {
  pub fn pipeline(&self, stage: Stage) -> Option<&Arc<Pipeline>> {
    self.pipelines.get(&stage)
  }

  /// True when every configured entry made it into a pipeline.
  pub fn is_clean(&self) -> bool {
    self.errors.is_empty()
  }

  /// Installs every built pipeline on `host`, keyed by stage and operation.
  pub fn install<H: HookHost + ?Sized>(&self, host: &mut H) {
    for (stage, pipeline) in &self.pipelines {
      host.install(*stage, pipeline.operation(), pipeline.clone());
    }
  }
}

impl<'r> PipelineBuilder<'r> {
  pub fn new(registry: &'r StepRegistry) -> Self {
    Self {
      registry,
      matcher: PredicateMatcher::new(),
      operation: DEFAULT_OPERATION.to_string(),
    }
  }

  pub fn with_matcher(mut self, matcher: PredicateMatcher) -> Self {
    self.matcher = matcher;
    self
  }

  pub fn for_operation(mut self, operation: impl Into<String>) -> Self {
    self.operation = operation.into();
    self
  }

  pub fn operation(&self) -> &str {
    &self.operation
  }

  /// Builds one pipeline per recognised stage of `config`.
  ///
  /// Never fails as a whole: unknown stages, unresolved or unconstructible
  /// steps, malformed entries and invalid filters end up in
  /// [`BuildOutput::errors`].
  #[instrument(name = "PipelineBuilder::build", skip_all, fields(operation = %self.operation, num_stages = config.len()))]
  pub fn build(&self, config: &HookConfig) -> BuildOutput {
    let mut output = BuildOutput::default();

    for (stage_key, entries) in config.stages() {
      let stage = match stage_key.parse::<Stage>() {
        Ok(stage) => stage,
        Err(unknown) => {
          event!(Level::ERROR, stage = %unknown, "Unknown stage in hook configuration; skipped.");
          output.errors.push(HookError::UnknownStage { stage: unknown });
          continue;
        }
      };

      let Value::Object(entries) = entries else {
        let err = HookError::Configuration {
          location: stage_key.clone(),
          message: format!("stage must map entry keys to entries, got {}", entries),
        };
        event!(Level::ERROR, %stage, error = %err, "Stage skipped.");
        output.errors.push(err);
        continue;
      };

      let mut pipeline_entries = Vec::with_capacity(entries.len());
      for (key, value) in entries {
        let built = if key == PARALLEL_KEY {
          self.build_parallel(stage, value, &mut output.errors)
        } else {
          self.build_entry(stage, key, value, &mut output.errors)
        };
        if let Some(entry) = built {
          pipeline_entries.push(entry);
        }
      }

      event!(
        Level::DEBUG,
        %stage,
        num_entries = pipeline_entries.len(),
        "Stage pipeline built."
      );
      let pipeline = Pipeline::from_entries(stage, self.operation.clone(), pipeline_entries);
      output.pipelines.insert(stage, Arc::new(pipeline));
    }

    if !output.errors.is_empty() {
      event!(Level::WARN, num_errors = output.errors.len(), "Hook configuration built with errors.");
    }
    output
  }

  /// Builds `config` and installs the result on `host`.
  pub fn build_into<H: HookHost + ?Sized>(&self, config: &HookConfig, host: &mut H) -> BuildOutput {
    let output = self.build(config);
    output.install(host);
    output
  }

  fn build_entry(&self, stage: Stage, key: &str, value: &Value, errors: &mut Vec<HookError>) -> Option<PipelineEntry> {
    let def = match StepDefinition::from_entry(stage.as_str(), key, value) {
      Ok(Some(def)) => def,
      Ok(None) => {
        event!(Level::DEBUG, %stage, entry_key = key, "Entry disabled.");
        return None;
      }
      Err(e) => {
        event!(Level::ERROR, %stage, entry_key = key, error = %e, "Malformed entry skipped.");
        errors.push(e);
        return None;
      }
    };

    match self.build_step(stage, &def) {
      Ok(hook) => Some(PipelineEntry::step(def.key, def.name, hook)),
      Err(e) => {
        event!(Level::ERROR, %stage, entry_key = key, error = %e, "Entry skipped.");
        errors.push(e);
        None
      }
    }
  }

  fn build_parallel(&self, stage: Stage, value: &Value, errors: &mut Vec<HookError>) -> Option<PipelineEntry> {
    let (group_def, member_errors) = match ParallelGroupDefinition::from_entry(stage.as_str(), value) {
      Ok(parsed) => parsed,
      Err(e) => {
        event!(Level::ERROR, %stage, error = %e, "Malformed parallel entry skipped.");
        errors.push(e);
        return None;
      }
    };
    for e in member_errors {
      event!(Level::ERROR, %stage, error = %e, "Malformed parallel member skipped.");
      errors.push(e);
    }

    let mut members = Vec::with_capacity(group_def.members.len());
    for def in &group_def.members {
      match self.build_step(stage, def) {
        Ok(hook) => members.push((def.name.clone(), hook)),
        Err(e) => {
          event!(Level::ERROR, %stage, step_name = %def.name, error = %e, "Parallel member skipped.");
          errors.push(e);
        }
      }
    }

    if members.is_empty() {
      event!(Level::WARN, %stage, "Parallel group has no buildable members; dropped.");
      return None;
    }
    Some(PipelineEntry::parallel(PARALLEL_KEY, ParallelGroup::new(members)))
  }

  /// Resolves, constructs and wraps one step: `guarded(fault_tolerant?(named(step)))`.
  fn build_step(&self, stage: Stage, def: &StepDefinition) -> Result<Hook, HookError> {
    let ctor = self.registry.lookup(&def.name).ok_or_else(|| HookError::StepNotFound {
      step_name: def.name.clone(),
      stage,
    })?;

    let predicate = self.matcher.build_predicate(&def.name, def.options.match_filter())?;

    let step = ctor(&def.options).map_err(|source| HookError::StepConstruction {
      step_name: def.name.clone(),
      source,
    })?;

    let mut hook = named(def.name.clone(), step);
    if def.options.fault_tolerant() {
      hook = fault_tolerant(def.name.clone(), hook);
    }
    event!(
      Level::TRACE,
      %stage,
      entry_key = %def.key,
      step_name = %def.name,
      fault_tolerant = def.options.fault_tolerant(),
      "Step built."
    );
    Ok(guarded(def.name.clone(), predicate, hook))
  }
}
