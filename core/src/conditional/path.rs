// hookline/src/conditional/path.rs

//! Dotted field paths (`address.city`, `tags.0`) over JSON items.

use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
  raw: String,
  segments: Vec<String>,
}

impl FieldPath {
  /// Returns `None` for an empty path or one with an empty segment (`a..b`).
  pub fn parse(raw: &str) -> Option<Self> {
    if raw.is_empty() {
      return None;
    }
    let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
      return None;
    }
    Some(Self {
      raw: raw.to_string(),
      segments,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  /// Strict lookup: objects by key, arrays by numeric index.
  pub fn get<'a>(&self, item: &'a Value) -> Option<&'a Value> {
    self
      .segments
      .iter()
      .try_fold(item, |current, segment| child(current, segment))
  }

  /// Query lookup: like [`get`](Self::get), but a non-numeric segment applied
  /// to an array descends into every element, collecting all reachable values.
  pub fn resolve_all<'a>(&self, item: &'a Value) -> Vec<&'a Value> {
    let mut found = Vec::new();
    collect(item, &self.segments, &mut found);
    found
  }

  /// Writes `value` at the path, creating missing intermediate objects.
  /// Returns false when the path runs through a scalar or a missing array slot.
  pub fn set(&self, item: &mut Value, value: Value) -> bool {
    let Some((last, parents)) = self.segments.split_last() else {
      return false;
    };
    let mut current = item;
    for segment in parents {
      current = match current {
        Value::Object(map) => map
          .entry(segment.clone())
          .or_insert_with(|| Value::Object(Map::new())),
        Value::Array(items) => match segment.parse::<usize>() {
          Ok(idx) if idx < items.len() => &mut items[idx],
          _ => return false,
        },
        _ => return false,
      };
    }
    match current {
      Value::Object(map) => {
        map.insert(last.clone(), value);
        true
      }
      Value::Array(items) => match last.parse::<usize>() {
        Ok(idx) if idx < items.len() => {
          items[idx] = value;
          true
        }
        _ => false,
      },
      _ => false,
    }
  }

  /// Removes the value at the path. Array elements are removed, shifting the rest.
  pub fn remove(&self, item: &mut Value) -> Option<Value> {
    let (last, parents) = self.segments.split_last()?;
    let mut current = item;
    for segment in parents {
      current = child_mut(current, segment)?;
    }
    match current {
      Value::Object(map) => map.shift_remove(last),
      Value::Array(items) => {
        let idx = last.parse::<usize>().ok()?;
        (idx < items.len()).then(|| items.remove(idx))
      }
      _ => None,
    }
  }
}

impl fmt::Display for FieldPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
  match value {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
    _ => None,
  }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
  match value {
    Value::Object(map) => map.get_mut(segment),
    Value::Array(items) => {
      let idx = segment.parse::<usize>().ok()?;
      items.get_mut(idx)
    }
    _ => None,
  }
}

fn collect<'a>(current: &'a Value, segments: &[String], found: &mut Vec<&'a Value>) {
  let Some((head, rest)) = segments.split_first() else {
    found.push(current);
    return;
  };
  match current {
    Value::Object(map) => {
      if let Some(next) = map.get(head) {
        collect(next, rest, found);
      }
    }
    Value::Array(items) => match head.parse::<usize>() {
      Ok(idx) => {
        if let Some(next) = items.get(idx) {
          collect(next, rest, found);
        }
      }
      Err(_) => {
        for element in items.iter().filter(|el| el.is_object()) {
          collect(element, segments, found);
        }
      }
    },
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn parse_rejects_empty_segments() {
    assert!(FieldPath::parse("").is_none());
    assert!(FieldPath::parse("a..b").is_none());
    assert!(FieldPath::parse(".a").is_none());
    assert_eq!(FieldPath::parse("a.b").unwrap().segments(), &["a", "b"]);
  }

  #[test]
  fn get_walks_objects_and_indices() {
    let item = json!({ "a": { "b": [10, { "c": "deep" }] } });
    assert_eq!(FieldPath::parse("a.b.0").unwrap().get(&item), Some(&json!(10)));
    assert_eq!(FieldPath::parse("a.b.1.c").unwrap().get(&item), Some(&json!("deep")));
    assert_eq!(FieldPath::parse("a.x").unwrap().get(&item), None);
    assert_eq!(FieldPath::parse("a.b.c").unwrap().get(&item), None);
  }

  #[test]
  fn resolve_all_fans_out_over_arrays_of_objects() {
    let item = json!({ "rows": [{ "id": 1 }, { "id": 2 }, { "other": 3 }] });
    let found = FieldPath::parse("rows.id").unwrap().resolve_all(&item);
    assert_eq!(found, vec![&json!(1), &json!(2)]);
  }

  #[test]
  fn set_creates_intermediate_objects() {
    let mut item = json!({ "a": 1 });
    assert!(FieldPath::parse("meta.source.name").unwrap().set(&mut item, json!("x")));
    assert_eq!(item, json!({ "a": 1, "meta": { "source": { "name": "x" } } }));
    assert!(!FieldPath::parse("a.b").unwrap().set(&mut item, json!(2)));
  }

  #[test]
  fn remove_deletes_keys_and_elements() {
    let mut item = json!({ "a": { "b": 1, "c": 2 }, "list": [1, 2, 3] });
    assert_eq!(FieldPath::parse("a.b").unwrap().remove(&mut item), Some(json!(1)));
    assert_eq!(FieldPath::parse("list.1").unwrap().remove(&mut item), Some(json!(2)));
    assert_eq!(FieldPath::parse("missing.x").unwrap().remove(&mut item), None);
    assert_eq!(item, json!({ "a": { "c": 2 }, "list": [1, 3] }));
  }
}
