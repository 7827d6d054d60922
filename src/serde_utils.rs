use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A YAML value that may be written as a bare number or a quoted string.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
#[serde(untagged)]
pub enum StringOrNum {
  Num(i64),
  String(String),
}

impl Display for StringOrNum {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Num(n) => write!(f, "{n}"),
      Self::String(s) => f.write_str(s),
    }
  }
}

impl From<&str> for StringOrNum {
  fn from(value: &str) -> Self {
    Self::String(value.to_string())
  }
}

/// A field accepting either a single string or a sequence of strings.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord)]
#[serde(untagged)]
pub enum StringOrList {
  String(String),
  List(Vec<String>),
}

impl StringOrList {
  pub fn into_vec(self) -> Vec<String> {
    match self {
      Self::String(s) => vec![s],
      Self::List(list) => list,
    }
  }
}

impl From<Vec<String>> for StringOrList {
  fn from(value: Vec<String>) -> Self {
    Self::List(value)
  }
}

/// A scalar of any YAML type, rendered back to its string form on demand.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(untagged)]
pub enum SingleValue {
  String(String),
  Bool(bool),
  Int(i64),
  Float(f64),
}

impl Display for SingleValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::String(s) => f.write_str(s),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Int(i) => write!(f, "{i}"),
      Self::Float(fl) => write!(f, "{fl}"),
    }
  }
}

/// A field accepting either a `KEY=VALUE` sequence or a mapping.
///
/// Docker Compose allows both forms for `environment` and `labels`. Mapping
/// values may be absent (`KEY:`) or any scalar type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListOrMap {
  List(Vec<String>),
  Map(IndexMap<String, Option<SingleValue>>),
}

impl ListOrMap {
  /// Flattens both forms into a string map. List entries are split on the
  /// first `=`; entries without one are dropped. Absent mapping values become
  /// empty strings.
  pub fn into_string_map(self) -> IndexMap<String, String> {
    match self {
      Self::List(entries) => entries
        .into_iter()
        .filter_map(|entry| {
          entry
            .split_once('=')
            .map(|(key, value)| (key.to_string(), value.to_string()))
        })
        .collect(),
      Self::Map(map) => map
        .into_iter()
        .map(|(key, value)| (key, value.map(|v| v.to_string()).unwrap_or_default()))
        .collect(),
    }
  }
}

impl From<IndexMap<String, String>> for ListOrMap {
  fn from(map: IndexMap<String, String>) -> Self {
    Self::Map(
      map
        .into_iter()
        .map(|(key, value)| (key, Some(SingleValue::String(value))))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use indexmap::indexmap;
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn list_form_splits_on_first_equals() {
    let env = ListOrMap::List(vec![
      "KEY=value".to_string(),
      "URL=postgres://db:5432".to_string(),
      "MALFORMED".to_string(),
    ]);

    let map = env.into_string_map();

    assert_eq!(
      map,
      indexmap! {
        "KEY".to_string() => "value".to_string(),
        "URL".to_string() => "postgres://db:5432".to_string(),
      }
    );
  }

  #[test]
  fn map_form_stringifies_scalars() {
    let env = ListOrMap::Map(indexmap! {
      "PORT".to_string() => Some(SingleValue::Int(8080)),
      "DEBUG".to_string() => Some(SingleValue::Bool(true)),
      "EMPTY".to_string() => None,
    });

    let map = env.into_string_map();

    assert_eq!(map["PORT"], "8080");
    assert_eq!(map["DEBUG"], "true");
    assert_eq!(map["EMPTY"], "");
  }
}
