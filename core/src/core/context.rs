// hookline/src/core/context.rs

//! Defines `HookContext`, the per-item record threaded through a stage pipeline,
//! and the `Stage` marker that selects which part of it is the "current item".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The lifecycle point a pipeline runs at, relative to the host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  Before,
  After,
}

impl Stage {
  pub const ALL: [Stage; 2] = [Stage::Before, Stage::After];

  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Before => "before",
      Stage::After => "after",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Stage {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "before" => Ok(Stage::Before),
      "after" => Ok(Stage::After),
      other => Err(other.to_string()),
    }
  }
}

/// Holds what the host operation produced. After-stage steps operate on `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultContainer {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
}

impl ResultContainer {
  pub fn new(data: Value) -> Self {
    Self { data: Some(data) }
  }
}

/// Mutable record for one processed item during one stage run.
///
/// A context is created by the caller for a single item, wrapped in a
/// [`ContextData`](crate::ContextData) handle and handed to a pipeline. Steps
/// mutate it in place. It is never shared between two items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookContext {
  pub stage: Stage,

  /// Operation kind of the host call, e.g. `"create"`.
  pub operation: String,

  /// Input data, the current item of a `before` stage.
  #[serde(default)]
  pub data: Option<Value>,

  #[serde(default)]
  pub result: ResultContainer,

  /// Free-form parameters supplied by the caller.
  #[serde(default)]
  pub params: Map<String, Value>,
}

impl HookContext {
  pub fn new(stage: Stage, operation: impl Into<String>) -> Self {
    Self {
      stage,
      operation: operation.into(),
      data: None,
      result: ResultContainer::default(),
      params: Map::new(),
    }
  }

  /// Context for a `before` stage carrying `data` as input.
  pub fn before(operation: impl Into<String>, data: Value) -> Self {
    Self {
      data: Some(data),
      ..Self::new(Stage::Before, operation)
    }
  }

  /// Context for an `after` stage carrying `result_data` as the result.
  pub fn after(operation: impl Into<String>, result_data: Value) -> Self {
    Self {
      result: ResultContainer::new(result_data),
      ..Self::new(Stage::After, operation)
    }
  }

  pub fn with_params(mut self, params: Map<String, Value>) -> Self {
    self.params = params;
    self
  }

  /// The item the stage operates on: input data before, result data after.
  pub fn current_item(&self) -> Option<&Value> {
    match self.stage {
      Stage::Before => self.data.as_ref(),
      Stage::After => self.result.data.as_ref(),
    }
  }

  pub fn current_item_mut(&mut self) -> Option<&mut Value> {
    match self.stage {
      Stage::Before => self.data.as_mut(),
      Stage::After => self.result.data.as_mut(),
    }
  }

  /// Applies onto `self` only what `changed` altered relative to `base`.
  ///
  /// Objects are compared key by key, so fields nobody touched in `changed`
  /// keep whatever `self` holds now. Any other changed value (scalar, array,
  /// type change) replaces the one in `self` as a whole.
  pub fn apply_changes(&mut self, base: &HookContext, changed: &HookContext) {
    if base.stage != changed.stage {
      self.stage = changed.stage;
    }
    if base.operation != changed.operation {
      self.operation = changed.operation.clone();
    }
    merge_optional(&mut self.data, &base.data, &changed.data);
    merge_optional(&mut self.result.data, &base.result.data, &changed.result.data);
    merge_map(&mut self.params, &base.params, &changed.params);
  }
}

fn merge_optional(target: &mut Option<Value>, base: &Option<Value>, changed: &Option<Value>) {
  if base == changed {
    return;
  }
  match (target.as_mut(), base, changed) {
    (Some(current), Some(base), Some(changed)) => merge_value(current, base, changed),
    _ => *target = changed.clone(),
  }
}

fn merge_value(target: &mut Value, base: &Value, changed: &Value) {
  if base == changed {
    return;
  }
  match (target, base, changed) {
    (Value::Object(current), Value::Object(base), Value::Object(changed)) => merge_map(current, base, changed),
    (target, _, changed) => *target = changed.clone(),
  }
}

fn merge_map(target: &mut Map<String, Value>, base: &Map<String, Value>, changed: &Map<String, Value>) {
  for (key, new_value) in changed {
    match (base.get(key), target.get_mut(key)) {
      (Some(old_value), _) if old_value == new_value => {}
      (Some(old_value), Some(current)) => merge_value(current, old_value, new_value),
      _ => {
        target.insert(key.clone(), new_value.clone());
      }
    }
  }
  for key in base.keys() {
    if !changed.contains_key(key) {
      target.shift_remove(key);
    }
  }
}
