// hookline/src/conditional/matcher.rs

//! Builds the guard that decides, per context, whether a step runs.

use crate::conditional::query::Filter;
use crate::core::context::HookContext;
use crate::error::{HookError, HookResult};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{event, Level};

/// Field on the current item that marks it as not to be processed.
pub const SKIP_FIELD: &str = "skip";

/// Guard evaluated before a step runs. `false` means the step is skipped.
pub type Predicate = Arc<dyn Fn(&HookContext) -> bool + Send + Sync + 'static>;

/// Builds step guards from `match` filters.
///
/// Every guard starts from the default filter, which only lets an item through
/// when its skip marker is absent or falsy (`null`, `false`, `0`, `""`). A
/// step's own filter is merged over it key by key, so overriding `skip`
/// replaces that condition while every other default condition stays.
#[derive(Debug, Clone)]
pub struct PredicateMatcher {
  skip_field: String,
}

impl Default for PredicateMatcher {
  fn default() -> Self {
    Self::new()
  }
}

impl PredicateMatcher {
  pub fn new() -> Self {
    Self {
      skip_field: SKIP_FIELD.to_string(),
    }
  }

  /// Uses a different field as the skip marker.
  pub fn with_skip_field(skip_field: impl Into<String>) -> Self {
    Self {
      skip_field: skip_field.into(),
    }
  }

  pub fn skip_field(&self) -> &str {
    &self.skip_field
  }

  pub fn default_filter(&self) -> Map<String, Value> {
    let mut filter = Map::new();
    filter.insert(self.skip_field.clone(), json!({ "$in": [null, false, 0, ""] }));
    filter
  }

  /// Default filter with `filter_override`'s keys taking precedence.
  pub fn merged_filter(&self, step_name: &str, filter_override: Option<&Value>) -> HookResult<Map<String, Value>> {
    let mut merged = self.default_filter();
    match filter_override {
      None | Some(Value::Null) => {}
      Some(Value::Object(custom)) => {
        for (key, value) in custom {
          merged.insert(key.clone(), value.clone());
        }
      }
      Some(other) => {
        return Err(HookError::InvalidFilter {
          step_name: step_name.to_string(),
          message: format!("match filter must be an object, got {}", other),
        })
      }
    }
    Ok(merged)
  }

  /// Compiles the merged filter for `step_name` and returns its guard.
  ///
  /// The guard reads the current item (input data before, result data after),
  /// resolves templated operands against it and evaluates the filter. It
  /// returns `false` when the context has no current item and never mutates
  /// the context.
  pub fn build_predicate(&self, step_name: &str, filter_override: Option<&Value>) -> HookResult<Predicate> {
    let merged = self.merged_filter(step_name, filter_override)?;
    let filter = Filter::compile_map(&merged).map_err(|e| HookError::InvalidFilter {
      step_name: step_name.to_string(),
      message: e.to_string(),
    })?;
    let filter_json = Value::Object(merged);
    event!(Level::TRACE, %step_name, filter = %filter_json, "Predicate compiled.");

    let step_name = step_name.to_string();
    Ok(Arc::new(move |ctx: &HookContext| {
      let Some(item) = ctx.current_item() else {
        event!(Level::DEBUG, step_name = %step_name, stage = %ctx.stage, "No current item on context; step will not run.");
        return false;
      };
      let matched = filter.matches(item);
      event!(Level::TRACE, step_name = %step_name, stage = %ctx.stage, matched, "Predicate evaluated.");
      matched
    }))
  }
}
