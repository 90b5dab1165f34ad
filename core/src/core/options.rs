// hookline/src/core/options.rs

//! Options of a single configuration entry.

use crate::error::{HookError, HookResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Override of the step name. Mandatory on members of a parallel group.
pub const HOOK_FIELD: &str = "hook";
/// Filter merged over the default skip filter.
pub const MATCH_FIELD: &str = "match";
pub const FAULT_TOLERANT_FIELD: &str = "faultTolerant";

/// Options mapping of one entry.
///
/// The engine reads `hook`, `match` and `faultTolerant`; every field, those
/// included, is handed to the step constructor unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOptions {
  hook: Option<String>,
  match_filter: Option<Value>,
  fault_tolerant: bool,
  raw: Map<String, Value>,
}

impl StepOptions {
  /// Validates the engine fields of `raw`. `location` names the entry in errors.
  pub fn parse(location: &str, raw: Map<String, Value>) -> HookResult<Self> {
    let hook = match raw.get(HOOK_FIELD) {
      None | Some(Value::Null) => None,
      Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
      Some(other) => {
        return Err(HookError::Configuration {
          location: location.to_string(),
          message: format!("'{}' must be a non-empty string, got {}", HOOK_FIELD, other),
        })
      }
    };

    let match_filter = match raw.get(MATCH_FIELD) {
      None | Some(Value::Null) => None,
      Some(filter @ Value::Object(_)) => Some(filter.clone()),
      Some(other) => {
        return Err(HookError::Configuration {
          location: location.to_string(),
          message: format!("'{}' must be an object, got {}", MATCH_FIELD, other),
        })
      }
    };

    let fault_tolerant = match raw.get(FAULT_TOLERANT_FIELD) {
      None | Some(Value::Null) => false,
      Some(Value::Bool(flag)) => *flag,
      Some(other) => {
        return Err(HookError::Configuration {
          location: location.to_string(),
          message: format!("'{}' must be a boolean, got {}", FAULT_TOLERANT_FIELD, other),
        })
      }
    };

    Ok(Self {
      hook,
      match_filter,
      fault_tolerant,
      raw,
    })
  }

  pub fn hook(&self) -> Option<&str> {
    self.hook.as_deref()
  }

  pub fn match_filter(&self) -> Option<&Value> {
    self.match_filter.as_ref()
  }

  pub fn fault_tolerant(&self) -> bool {
    self.fault_tolerant
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.raw.get(key)
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.raw.get(key).and_then(Value::as_str)
  }

  pub fn get_bool(&self, key: &str) -> Option<bool> {
    self.raw.get(key).and_then(Value::as_bool)
  }

  pub fn as_map(&self) -> &Map<String, Value> {
    &self.raw
  }

  /// Deserializes the options into a step's own typed config.
  pub fn deserialize<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
    Ok(serde_json::from_value(Value::Object(self.raw.clone()))?)
  }
}
