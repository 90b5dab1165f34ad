// hookline/src/steps/fields.rs

use crate::conditional::path::FieldPath;
use crate::conditional::template::Template;
use crate::core::context::HookContext;
use crate::core::context_data::ContextData;
use crate::core::options::StepOptions;
use crate::core::step::HookStep;
use anyhow::{anyhow, bail, Context as _};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
struct AssignOptions {
  fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct PathListOptions {
  fields: Vec<String>,
}

fn parse_paths(raw: &[String]) -> anyhow::Result<Vec<FieldPath>> {
  raw
    .iter()
    .map(|p| FieldPath::parse(p).ok_or_else(|| anyhow!("invalid field path '{}'", p)))
    .collect()
}

/// Assigns `fields` onto the current item. Values may be templates such as
/// `"$other.field"` or `"${id}.json"`, resolved against the item before any
/// field is written.
#[derive(Debug, Clone)]
pub struct SetStep {
  assignments: Vec<(FieldPath, Template)>,
}

impl SetStep {
  pub fn from_options(opts: &StepOptions) -> anyhow::Result<Self> {
    let parsed: AssignOptions = opts.deserialize().context("'set' expects an object under 'fields'")?;
    let assignments = parsed
      .fields
      .iter()
      .map(|(path, value)| {
        let path = FieldPath::parse(path).ok_or_else(|| anyhow!("invalid field path '{}'", path))?;
        let template = Template::compile(value).map_err(|e| anyhow!(e))?;
        Ok((path, template))
      })
      .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Self { assignments })
  }
}

#[async_trait]
impl HookStep for SetStep {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()> {
    let mut guard = ctx.write();
    let item = guard.current_item_mut().ok_or_else(|| anyhow!("no current item to set fields on"))?;
    let resolved: Vec<Value> = self
      .assignments
      .iter()
      .map(|(_, template)| template.resolve(item).into_owned())
      .collect();
    for ((path, _), value) in self.assignments.iter().zip(resolved) {
      if !path.set(item, value) {
        bail!("cannot set field '{}' on the current item", path);
      }
    }
    Ok(())
  }
}

/// Removes `fields` from the current item. Missing fields are ignored.
#[derive(Debug, Clone)]
pub struct UnsetStep {
  paths: Vec<FieldPath>,
}

impl UnsetStep {
  pub fn from_options(opts: &StepOptions) -> anyhow::Result<Self> {
    let parsed: PathListOptions = opts.deserialize().context("'unset' expects an array under 'fields'")?;
    Ok(Self {
      paths: parse_paths(&parsed.fields)?,
    })
  }
}

#[async_trait]
impl HookStep for UnsetStep {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()> {
    let mut guard = ctx.write();
    let item = guard.current_item_mut().ok_or_else(|| anyhow!("no current item to unset fields on"))?;
    for path in &self.paths {
      path.remove(item);
    }
    Ok(())
  }
}

/// Fails unless every path in `fields` is present on the current item.
#[derive(Debug, Clone)]
pub struct RequireStep {
  paths: Vec<FieldPath>,
}

impl RequireStep {
  pub fn from_options(opts: &StepOptions) -> anyhow::Result<Self> {
    let parsed: PathListOptions = opts.deserialize().context("'require' expects an array under 'fields'")?;
    Ok(Self {
      paths: parse_paths(&parsed.fields)?,
    })
  }
}

#[async_trait]
impl HookStep for RequireStep {
  async fn call(&self, ctx: ContextData<HookContext>) -> anyhow::Result<()> {
    let guard = ctx.read();
    let item = guard.current_item().ok_or_else(|| anyhow!("no current item to check"))?;
    let missing: Vec<&str> = self
      .paths
      .iter()
      .filter(|p| p.get(item).is_none())
      .map(FieldPath::as_str)
      .collect();
    if !missing.is_empty() {
      bail!("missing required field(s): {}", missing.join(", "));
    }
    Ok(())
  }
}
