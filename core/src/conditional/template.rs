// hookline/src/conditional/template.rs

//! Values that refer back to fields of the item being matched.
//!
//! Syntax, applied to string values only:
//!  - `"$path"`         the value at `path`, type preserved (`null` when absent)
//!  - `"$$text"`        the literal string `"$text"`
//!  - `"id-${path}"`    string interpolation; absent fields render as ""
//!
//! Arrays and objects are compiled element-wise, so templates may be nested.

use crate::conditional::path::FieldPath;
use serde_json::{Map, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
  Literal(Value),
  Field(FieldPath),
  Interpolated(Vec<Segment>),
  Array(Vec<Template>),
  Object(Vec<(String, Template)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
  Text(String),
  Field(FieldPath),
}

impl Template {
  pub fn compile(value: &Value) -> Result<Template, String> {
    let compiled = match value {
      Value::String(s) => compile_string(s)?,
      Value::Array(items) => {
        let parts = items.iter().map(Template::compile).collect::<Result<Vec<_>, _>>()?;
        if parts.iter().all(|p| matches!(p, Template::Literal(_))) {
          Template::Literal(value.clone())
        } else {
          Template::Array(parts)
        }
      }
      Value::Object(map) => {
        let parts = map
          .iter()
          .map(|(k, v)| Template::compile(v).map(|t| (k.clone(), t)))
          .collect::<Result<Vec<_>, _>>()?;
        if parts.iter().all(|(_, p)| matches!(p, Template::Literal(_))) {
          Template::Literal(value.clone())
        } else {
          Template::Object(parts)
        }
      }
      other => Template::Literal(other.clone()),
    };
    Ok(compiled)
  }

  /// True if resolution depends on the item.
  pub fn is_dynamic(&self) -> bool {
    !matches!(self, Template::Literal(_))
  }

  pub fn resolve<'a>(&'a self, item: &Value) -> Cow<'a, Value> {
    match self {
      Template::Literal(value) => Cow::Borrowed(value),
      Template::Field(path) => Cow::Owned(path.get(item).cloned().unwrap_or(Value::Null)),
      Template::Interpolated(segments) => {
        let mut out = String::new();
        for segment in segments {
          match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(path) => match path.get(item) {
              Some(Value::String(s)) => out.push_str(s),
              Some(Value::Null) | None => {}
              Some(other) => out.push_str(&other.to_string()),
            },
          }
        }
        Cow::Owned(Value::String(out))
      }
      Template::Array(parts) => Cow::Owned(Value::Array(
        parts.iter().map(|p| p.resolve(item).into_owned()).collect(),
      )),
      Template::Object(parts) => {
        let map: Map<String, Value> = parts
          .iter()
          .map(|(k, p)| (k.clone(), p.resolve(item).into_owned()))
          .collect();
        Cow::Owned(Value::Object(map))
      }
    }
  }
}

fn compile_string(s: &str) -> Result<Template, String> {
  if let Some(escaped) = s.strip_prefix("$$") {
    return Ok(Template::Literal(Value::String(format!("${}", escaped))));
  }
  if let Some(reference) = s.strip_prefix('$') {
    if !reference.starts_with('{') {
      let path = FieldPath::parse(reference).ok_or_else(|| format!("invalid field reference '{}'", s))?;
      return Ok(Template::Field(path));
    }
  }
  if !s.contains("${") {
    return Ok(Template::Literal(Value::String(s.to_string())));
  }

  let mut segments = Vec::new();
  let mut rest = s;
  while let Some(start) = rest.find("${") {
    if start > 0 {
      segments.push(Segment::Text(rest[..start].to_string()));
    }
    let after = &rest[start + 2..];
    let end = after
      .find('}')
      .ok_or_else(|| format!("unterminated '${{' in '{}'", s))?;
    let path = FieldPath::parse(after[..end].trim())
      .ok_or_else(|| format!("invalid field reference '{}' in '{}'", &after[..end], s))?;
    segments.push(Segment::Field(path));
    rest = &after[end + 1..];
  }
  if !rest.is_empty() {
    segments.push(Segment::Text(rest.to_string()));
  }
  Ok(Template::Interpolated(segments))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn resolve(template: Value, item: Value) -> Value {
    Template::compile(&template).unwrap().resolve(&item).into_owned()
  }

  #[test]
  fn field_reference_preserves_type() {
    assert_eq!(resolve(json!("$b"), json!({ "b": 5 })), json!(5));
    assert_eq!(resolve(json!("$a.b"), json!({ "a": { "b": [1, 2] } })), json!([1, 2]));
    assert_eq!(resolve(json!("$missing"), json!({})), Value::Null);
  }

  #[test]
  fn escaped_dollar_stays_literal() {
    assert_eq!(resolve(json!("$$b"), json!({ "b": 5 })), json!("$b"));
  }

  #[test]
  fn interpolation_renders_text() {
    assert_eq!(
      resolve(json!("${kind}-${id}.tif"), json!({ "kind": "dem", "id": 7 })),
      json!("dem-7.tif")
    );
    assert_eq!(resolve(json!("x-${nope}"), json!({})), json!("x-"));
  }

  #[test]
  fn nested_templates_inside_arrays_and_objects() {
    let template = json!({ "pair": ["$a", 1], "plain": "text" });
    assert!(Template::compile(&template).unwrap().is_dynamic());
    assert_eq!(
      resolve(template, json!({ "a": "z" })),
      json!({ "pair": ["z", 1], "plain": "text" })
    );
    assert!(!Template::compile(&json!([1, "a", { "b": 2 }])).unwrap().is_dynamic());
  }

  #[test]
  fn malformed_templates_are_rejected() {
    assert!(Template::compile(&json!("$")).is_err());
    assert!(Template::compile(&json!("a-${b")).is_err());
    assert!(Template::compile(&json!("${}")).is_err());
  }
}
