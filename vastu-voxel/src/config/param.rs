//! Generic key-value parameter source.
//!
//! Components are configured from a [`ParamMap`] rather than from typed
//! structs directly, so the same loader works for YAML files, command-line
//! overrides and hand-built maps in tests. Each component pulls the keys it
//! knows with the typed getters below and falls back to its defaults for
//! missing ones.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A single parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String (enum selectors, names)
    String(String),
    /// Ordered list
    List(Vec<ParamValue>),
    /// Nested parameter map
    Map(ParamMap),
}

impl ParamValue {
    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::String(_) => "string",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "map",
        }
    }

    /// Numeric value; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(v: ParamMap) -> Self {
        ParamValue::Map(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::List(v.into_iter().map(Into::into).collect())
    }
}

/// String-keyed parameter map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamMap(BTreeMap<String, ParamValue>);

impl ParamMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw value lookup
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Whether `name` is present
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the map empty?
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameter names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Float parameter, or `default` when absent.
    pub fn get_f32(&self, name: &str, default: f32) -> Result<f32, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| ConfigError::WrongType {
                    name: name.to_string(),
                    expected: "float",
                }),
        }
    }

    /// Integer parameter, or `default` when absent.
    pub fn get_i32(&self, name: &str, default: i32) -> Result<i32, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| ConfigError::WrongType {
                    name: name.to_string(),
                    expected: "int",
                }),
        }
    }

    /// Boolean parameter, or `default` when absent.
    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(_) => Err(ConfigError::WrongType {
                name: name.to_string(),
                expected: "bool",
            }),
        }
    }

    /// String parameter, or `default` when absent.
    pub fn get_str<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, ConfigError> {
        match self.0.get(name) {
            None => Ok(default),
            Some(ParamValue::String(v)) => Ok(v.as_str()),
            Some(_) => Err(ConfigError::WrongType {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }

    /// Nested map, if present.
    pub fn get_map(&self, name: &str) -> Result<Option<&ParamMap>, ConfigError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Map(v)) => Ok(Some(v)),
            Some(_) => Err(ConfigError::WrongType {
                name: name.to_string(),
                expected: "map",
            }),
        }
    }

    /// Three-element integer list (e.g. an index bound), if present.
    pub fn get_i32x3(&self, name: &str) -> Result<Option<[i32; 3]>, ConfigError> {
        let wrong_type = || ConfigError::WrongType {
            name: name.to_string(),
            expected: "list of 3 ints",
        };
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::List(items)) if items.len() == 3 => {
                let mut out = [0i32; 3];
                for (slot, item) in out.iter_mut().zip(items) {
                    *slot = item
                        .as_i64()
                        .and_then(|v| i32::try_from(v).ok())
                        .ok_or_else(wrong_type)?;
                }
                Ok(Some(out))
            }
            Some(_) => Err(wrong_type()),
        }
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
