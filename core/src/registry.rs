// hookline/src/registry.rs

//! Defines `StepRegistry`, the name → constructor table the builder resolves
//! configuration entries against.
//!
//! The registry has two layers. The built-in layer is fixed when the registry
//! is created; the custom layer can be changed at any time through
//! [`StepRegistry::register`] and [`StepRegistry::unregister`]. Lookups
//! consult the built-in layer first.
//!
//! The registry is an ordinary value: create it at start-up, hand it to a
//! [`PipelineBuilder`](crate::PipelineBuilder) and keep it for later
//! registrations. Builds read it without taking a snapshot, so mutating it
//! while a build is running gives unspecified resolution.

use crate::core::step::StepConstructor;
use crate::steps;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::{event, Level};

pub struct StepRegistry {
  builtins: HashMap<String, StepConstructor>,
  custom: RwLock<HashMap<String, StepConstructor>>,
}

impl StepRegistry {
  /// Creates a registry with no built-in steps.
  pub fn new() -> Self {
    Self::from_builtins(HashMap::new())
  }

  /// Creates a registry preloaded with the crate's built-in steps
  /// (`noop`, `log`, `set`, `unset`, `require`).
  pub fn with_builtins() -> Self {
    Self::from_builtins(steps::builtin_constructors())
  }

  /// Creates a registry whose built-in layer is exactly `builtins`.
  pub fn from_builtins(builtins: HashMap<String, StepConstructor>) -> Self {
    event!(Level::DEBUG, num_builtins = builtins.len(), "Step registry created.");
    Self {
      builtins,
      custom: RwLock::new(HashMap::new()),
    }
  }

  /// Binds `name` to `ctor` in the custom layer, replacing any previous binding.
  ///
  /// A custom binding that shares its name with a built-in is stored but
  /// shadowed: lookups keep returning the built-in.
  pub fn register(&self, name: impl Into<String>, ctor: StepConstructor) {
    let name = name.into();
    if self.builtins.contains_key(&name) {
      event!(Level::WARN, step_name = %name, "Registered step is shadowed by a built-in of the same name.");
    }
    let replaced = self.custom.write().insert(name.clone(), ctor).is_some();
    event!(Level::DEBUG, step_name = %name, replaced, "Custom step registered.");
  }

  /// Removes the custom binding for `name`. Returns whether one existed.
  pub fn unregister(&self, name: &str) -> bool {
    let removed = self.custom.write().remove(name).is_some();
    event!(Level::DEBUG, step_name = %name, removed, "Custom step unregistered.");
    removed
  }

  /// Resolves `name`, built-ins first. Absence is `None`, never an error.
  pub fn lookup(&self, name: &str) -> Option<StepConstructor> {
    if let Some(ctor) = self.builtins.get(name) {
      return Some(ctor.clone());
    }
    self.custom.read().get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.builtins.contains_key(name) || self.custom.read().contains_key(name)
  }

  pub fn builtin_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.builtins.keys().cloned().collect();
    names.sort();
    names
  }

  pub fn custom_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.custom.read().keys().cloned().collect();
    names.sort();
    names
  }
}

impl Default for StepRegistry {
  fn default() -> Self {
    Self::with_builtins()
  }
}

impl fmt::Debug for StepRegistry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepRegistry")
      .field("builtins", &self.builtin_names())
      .field("custom", &self.custom_names())
      .finish()
  }
}
