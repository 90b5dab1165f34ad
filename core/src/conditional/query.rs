// hookline/src/conditional/query.rs

//! A small interpreter for document-query filters.
//!
//! A filter is a JSON object. Each non-`$` key is a field path whose value is
//! either an operand (implicit `$eq`) or an object of operators. Top-level
//! `$and`, `$or` and `$nor` take arrays of sub-filters. Operand values are
//! [`Template`]s, resolved against the item at evaluation time.
//!
//! Field operators: `$eq $ne $gt $gte $lt $lte $in $nin $exists $regex
//! ($options) $size $all $not`.
//!
//! Matching follows document-store conventions: equality against an array
//! field also matches any of its elements, and `{ field: null }` matches a
//! missing field.

use crate::conditional::path::FieldPath;
use crate::conditional::template::Template;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FilterError(pub String);

impl FilterError {
  fn new(message: impl Into<String>) -> Self {
    FilterError(message.into())
  }
}

/// A compiled filter. All clauses must hold.
#[derive(Debug, Clone)]
pub struct Filter {
  clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
  Field { path: FieldPath, conditions: Vec<Condition> },
  And(Vec<Filter>),
  Or(Vec<Filter>),
  Nor(Vec<Filter>),
}

#[derive(Debug, Clone)]
enum Condition {
  Eq(Template),
  Ne(Template),
  Cmp(Ordering, bool, Template),
  In(Vec<Template>),
  Nin(Vec<Template>),
  Exists(bool),
  Regex(Regex),
  Size(usize),
  All(Vec<Template>),
  Not(Vec<Condition>),
}

impl Filter {
  pub fn compile(filter: &Value) -> Result<Filter, FilterError> {
    match filter {
      Value::Object(map) => Self::compile_map(map),
      other => Err(FilterError::new(format!("filter must be an object, got {}", other))),
    }
  }

  pub fn compile_map(map: &Map<String, Value>) -> Result<Filter, FilterError> {
    let mut clauses = Vec::with_capacity(map.len());
    for (key, value) in map {
      let clause = match key.as_str() {
        "$and" => Clause::And(compile_list(key, value)?),
        "$or" => Clause::Or(compile_list(key, value)?),
        "$nor" => Clause::Nor(compile_list(key, value)?),
        op if op.starts_with('$') => {
          return Err(FilterError::new(format!("unsupported top-level operator '{}'", op)))
        }
        field => {
          let path = FieldPath::parse(field).ok_or_else(|| FilterError::new(format!("invalid field path '{}'", field)))?;
          Clause::Field {
            path,
            conditions: compile_conditions(field, value)?,
          }
        }
      };
      clauses.push(clause);
    }
    Ok(Filter { clauses })
  }

  /// True if the item satisfies every clause.
  pub fn matches(&self, item: &Value) -> bool {
    self.clauses.iter().all(|clause| clause.matches(item))
  }
}

impl Clause {
  fn matches(&self, item: &Value) -> bool {
    match self {
      Clause::Field { path, conditions } => {
        let found = path.resolve_all(item);
        conditions.iter().all(|c| c.holds(&found, item))
      }
      Clause::And(filters) => filters.iter().all(|f| f.matches(item)),
      Clause::Or(filters) => filters.iter().any(|f| f.matches(item)),
      Clause::Nor(filters) => !filters.iter().any(|f| f.matches(item)),
    }
  }
}

fn compile_list(op: &str, value: &Value) -> Result<Vec<Filter>, FilterError> {
  match value {
    Value::Array(items) if !items.is_empty() => items.iter().map(Filter::compile).collect(),
    _ => Err(FilterError::new(format!("'{}' expects a non-empty array of filters", op))),
  }
}

fn is_operator_object(value: &Value) -> Result<bool, FilterError> {
  let Value::Object(map) = value else {
    return Ok(false);
  };
  let operators = map.keys().filter(|k| k.starts_with('$')).count();
  match operators {
    0 => Ok(false),
    n if n == map.len() => Ok(true),
    _ => Err(FilterError::new("cannot mix operators and plain fields in one expression")),
  }
}

fn compile_conditions(field: &str, value: &Value) -> Result<Vec<Condition>, FilterError> {
  if !is_operator_object(value)? {
    return Ok(vec![Condition::Eq(compile_operand(field, value)?)]);
  }
  let Value::Object(ops) = value else {
    return Err(FilterError::new(format!("operator expression on '{}' must be an object", field)));
  };

  let regex_options = match ops.get("$options") {
    None => "",
    Some(Value::String(flags)) => flags.as_str(),
    Some(_) => return Err(FilterError::new(format!("'$options' on '{}' must be a string", field))),
  };
  if ops.contains_key("$options") && !ops.contains_key("$regex") {
    return Err(FilterError::new(format!("'$options' on '{}' requires '$regex'", field)));
  }

  let mut conditions = Vec::with_capacity(ops.len());
  for (op, operand) in ops {
    let condition = match op.as_str() {
      "$eq" => Condition::Eq(compile_operand(field, operand)?),
      "$ne" => Condition::Ne(compile_operand(field, operand)?),
      "$gt" => Condition::Cmp(Ordering::Greater, false, compile_operand(field, operand)?),
      "$gte" => Condition::Cmp(Ordering::Greater, true, compile_operand(field, operand)?),
      "$lt" => Condition::Cmp(Ordering::Less, false, compile_operand(field, operand)?),
      "$lte" => Condition::Cmp(Ordering::Less, true, compile_operand(field, operand)?),
      "$in" => Condition::In(compile_operand_list(field, op, operand)?),
      "$nin" => Condition::Nin(compile_operand_list(field, op, operand)?),
      "$all" => Condition::All(compile_operand_list(field, op, operand)?),
      "$exists" => match operand {
        Value::Bool(flag) => Condition::Exists(*flag),
        _ => return Err(FilterError::new(format!("'$exists' on '{}' must be a boolean", field))),
      },
      "$size" => match operand.as_u64() {
        Some(n) => Condition::Size(n as usize),
        None => return Err(FilterError::new(format!("'$size' on '{}' must be a non-negative integer", field))),
      },
      "$regex" => Condition::Regex(compile_regex(field, operand, regex_options)?),
      "$options" => continue,
      "$not" => {
        if !is_operator_object(operand)? {
          return Err(FilterError::new(format!("'$not' on '{}' expects an operator object", field)));
        }
        Condition::Not(compile_conditions(field, operand)?)
      }
      other => return Err(FilterError::new(format!("unsupported operator '{}' on '{}'", other, field))),
    };
    conditions.push(condition);
  }
  Ok(conditions)
}

fn compile_operand(field: &str, operand: &Value) -> Result<Template, FilterError> {
  Template::compile(operand).map_err(|e| FilterError::new(format!("on '{}': {}", field, e)))
}

fn compile_operand_list(field: &str, op: &str, operand: &Value) -> Result<Vec<Template>, FilterError> {
  match operand {
    Value::Array(items) => items.iter().map(|v| compile_operand(field, v)).collect(),
    _ => Err(FilterError::new(format!("'{}' on '{}' expects an array", op, field))),
  }
}

fn compile_regex(field: &str, operand: &Value, options: &str) -> Result<Regex, FilterError> {
  let Value::String(pattern) = operand else {
    return Err(FilterError::new(format!("'$regex' on '{}' must be a string", field)));
  };
  let mut builder = RegexBuilder::new(pattern);
  for flag in options.chars() {
    match flag {
      'i' => builder.case_insensitive(true),
      'm' => builder.multi_line(true),
      's' => builder.dot_matches_new_line(true),
      'x' => builder.ignore_whitespace(true),
      other => return Err(FilterError::new(format!("unsupported regex option '{}' on '{}'", other, field))),
    };
  }
  builder
    .build()
    .map_err(|e| FilterError::new(format!("invalid regex on '{}': {}", field, e)))
}

impl Condition {
  fn holds(&self, found: &[&Value], item: &Value) -> bool {
    match self {
      Condition::Eq(operand) => equals_any(found, &operand.resolve(item)),
      Condition::Ne(operand) => !equals_any(found, &operand.resolve(item)),
      Condition::Cmp(wanted, inclusive, operand) => {
        let target = operand.resolve(item);
        candidates(found).any(|v| match compare(v, &target) {
          Some(Ordering::Equal) => *inclusive,
          Some(ord) => ord == *wanted,
          None => false,
        })
      }
      Condition::In(operands) => operands.iter().any(|o| equals_any(found, &o.resolve(item))),
      Condition::Nin(operands) => !operands.iter().any(|o| equals_any(found, &o.resolve(item))),
      Condition::Exists(expected) => found.is_empty() != *expected,
      Condition::Regex(re) => candidates(found).any(|v| v.as_str().map_or(false, |s| re.is_match(s))),
      Condition::Size(n) => found.iter().any(|v| v.as_array().map_or(false, |a| a.len() == *n)),
      Condition::All(operands) => found.iter().any(|v| match v {
        Value::Array(elements) => operands.iter().all(|o| {
          let wanted = o.resolve(item);
          elements.iter().any(|e| json_eq(e, &wanted))
        }),
        _ => false,
      }),
      Condition::Not(conditions) => !conditions.iter().all(|c| c.holds(found, item)),
    }
  }
}

/// The values themselves plus, for arrays, their elements.
fn candidates<'a>(found: &'a [&'a Value]) -> impl Iterator<Item = &'a Value> + 'a {
  found.iter().flat_map(|v| {
    let elements: &'a [Value] = match v {
      Value::Array(items) => items.as_slice(),
      _ => &[],
    };
    std::iter::once(*v).chain(elements.iter())
  })
}

fn equals_any(found: &[&Value], target: &Value) -> bool {
  if target.is_null() && found.is_empty() {
    return true;
  }
  candidates(found).any(|v| json_eq(v, target))
}

/// Structural equality that treats `5` and `5.0` as equal.
pub(crate) fn json_eq(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
      (Some(x), Some(y)) => x == y,
      _ => x == y,
    },
    (Value::Array(xs), Value::Array(ys)) => xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y)),
    (Value::Object(xm), Value::Object(ym)) => {
      xm.len() == ym.len() && xm.iter().all(|(k, x)| ym.get(k).map_or(false, |y| json_eq(x, y)))
    }
    _ => a == b,
  }
}

/// Ordering for same-typed scalars; other combinations are incomparable.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
    (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
    (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
    _ => None,
  }
}
