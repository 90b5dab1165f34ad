// hookline/src/config.rs

//! The hook configuration document and its per-entry definitions.
//!
//! ```yaml
//! before:
//!   require: { fields: [id] }
//!   parallel:
//!     - { hook: checksum }
//!     - { hook: thumbnail, faultTolerant: true }
//!   convert_again: { hook: convert, match: { format: csv } }
//! after:
//!   log: true
//! ```
//!
//! Key order is execution order; `serde_json` is built with `preserve_order`
//! so the ordered map survives loading from JSON and YAML.

use crate::core::options::{StepOptions, HOOK_FIELD};
use crate::error::{HookError, HookResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved entry key holding an ordered list of concurrently run steps.
pub const PARALLEL_KEY: &str = "parallel";

/// Stage name → (entry key → entry).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookConfig {
  stages: Map<String, Value>,
}

impl HookConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_value(value: Value) -> HookResult<Self> {
    match value {
      Value::Object(stages) => Ok(Self { stages }),
      other => Err(HookError::ConfigParse(format!(
        "hook configuration must be an object of stages, got {}",
        other
      ))),
    }
  }

  pub fn from_json_str(source: &str) -> HookResult<Self> {
    Self::from_value(serde_json::from_str(source)?)
  }

  pub fn from_yaml_str(source: &str) -> HookResult<Self> {
    Self::from_value(serde_yaml::from_str(source)?)
  }

  /// Adds or replaces the entries of one stage.
  pub fn with_stage(mut self, stage: impl Into<String>, entries: Value) -> Self {
    self.stages.insert(stage.into(), entries);
    self
  }

  pub fn stages(&self) -> &Map<String, Value> {
    &self.stages
  }

  pub fn stage_keys(&self) -> impl Iterator<Item = &str> {
    self.stages.keys().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }
}

/// One resolved entry: the key it was declared under, the step name to look
/// up, and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDefinition {
  pub key: String,
  pub name: String,
  pub options: StepOptions,
}

impl StepDefinition {
  /// Reads a non-parallel entry. `Ok(None)` means the entry is disabled (`false`).
  ///
  /// `null`, `true` and any string are shorthands for default options.
  pub fn from_entry(stage: &str, key: &str, value: &Value) -> HookResult<Option<Self>> {
    let location = format!("{}.{}", stage, key);
    let raw = match value {
      Value::Bool(false) => return Ok(None),
      Value::Null | Value::Bool(true) | Value::String(_) => Map::new(),
      Value::Object(map) => map.clone(),
      other => {
        return Err(HookError::Configuration {
          location,
          message: format!("entry must be an options object or a shorthand, got {}", other),
        })
      }
    };
    let options = StepOptions::parse(&location, raw)?;
    let name = options.hook().unwrap_or(key).to_string();
    Ok(Some(Self {
      key: key.to_string(),
      name,
      options,
    }))
  }

  /// Reads one member of a parallel group, which must name its step under `hook`.
  pub fn from_parallel_member(stage: &str, index: usize, value: &Value) -> HookResult<Self> {
    let location = format!("{}.{}[{}]", stage, PARALLEL_KEY, index);
    let Value::Object(map) = value else {
      return Err(HookError::Configuration {
        location,
        message: format!("parallel member must be an options object, got {}", value),
      });
    };
    let options = StepOptions::parse(&location, map.clone())?;
    let name = options
      .hook()
      .ok_or_else(|| HookError::Configuration {
        location: location.clone(),
        message: format!("parallel member is missing its '{}' field", HOOK_FIELD),
      })?
      .to_string();
    Ok(Self {
      key: name.clone(),
      name,
      options,
    })
  }
}

/// Members of a `parallel` entry, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelGroupDefinition {
  pub members: Vec<StepDefinition>,
}

impl ParallelGroupDefinition {
  /// Reads every member it can. Members that fail to parse are returned as
  /// errors next to the definition instead of failing the whole group.
  pub fn from_entry(stage: &str, value: &Value) -> HookResult<(Self, Vec<HookError>)> {
    let Value::Array(items) = value else {
      return Err(HookError::Configuration {
        location: format!("{}.{}", stage, PARALLEL_KEY),
        message: format!("'{}' must be an array of step entries, got {}", PARALLEL_KEY, value),
      });
    };
    let mut members = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
      match StepDefinition::from_parallel_member(stage, index, item) {
        Ok(def) => members.push(def),
        Err(e) => errors.push(e),
      }
    }
    Ok((Self { members }, errors))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn yaml_and_json_keep_declaration_order() {
    let yaml = "before:\n  zeta: true\n  alpha: {}\n  mid: shorthand\n";
    let config = HookConfig::from_yaml_str(yaml).unwrap();
    let keys: Vec<&str> = config.stages()["before"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

    let config = HookConfig::from_json_str(r#"{"after": {"b": null, "a": null}}"#).unwrap();
    let keys: Vec<&str> = config.stages()["after"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["b", "a"]);
  }

  #[test]
  fn non_object_documents_are_rejected() {
    assert!(matches!(HookConfig::from_json_str("[1, 2]"), Err(HookError::ConfigParse(_))));
    assert!(matches!(HookConfig::from_json_str("{not json"), Err(HookError::ConfigParse(_))));
  }

  #[test]
  fn entry_shorthands_and_override_name() {
    let def = StepDefinition::from_entry("before", "convert", &json!("default")).unwrap().unwrap();
    assert_eq!(def.name, "convert");
    assert!(!def.options.fault_tolerant());

    let def = StepDefinition::from_entry("before", "convert2", &json!({ "hook": "convert", "faultTolerant": true, "to": "json" }))
      .unwrap()
      .unwrap();
    assert_eq!(def.key, "convert2");
    assert_eq!(def.name, "convert");
    assert!(def.options.fault_tolerant());
    assert_eq!(def.options.get_str("to"), Some("json"));

    assert!(StepDefinition::from_entry("before", "off", &json!(false)).unwrap().is_none());
    assert!(StepDefinition::from_entry("before", "bad", &json!(3)).is_err());
    assert!(StepDefinition::from_entry("before", "bad", &json!({ "faultTolerant": "yes" })).is_err());
  }

  #[test]
  fn parallel_members_need_a_hook_name() {
    let (group, errors) = ParallelGroupDefinition::from_entry(
      "before",
      &json!([{ "hook": "a" }, { "option": 1 }, { "hook": "c", "match": { "x": 1 } }]),
    )
    .unwrap();
    let names: Vec<&str> = group.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
    assert_eq!(errors.len(), 1);
    assert!(ParallelGroupDefinition::from_entry("before", &json!({ "hook": "a" })).is_err());
  }
}
