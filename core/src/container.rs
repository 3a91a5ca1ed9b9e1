//! Key-based access to raw JSON objects.
//!
//! # Design
//! `GenericContainer` owns one decoded JSON object and never changes it after
//! construction. Callers ask for the primitive they want through
//! `get_as::<T>()`; the accepted source shapes for each target are fixed by
//! the `FromValue` impls below:
//!
//! | target   | accepted                                                      |
//! |----------|---------------------------------------------------------------|
//! | `String` | string, number (decimal text), bool (`"true"` / `"false"`)    |
//! | `i64`    | integer, float with zero fraction in range, `i64` string      |
//! | `u32`    | as `i64`, then range-checked                                  |
//! | `f64`    | any number, string parsing as `f64`                           |
//! | `bool`   | bool, numbers `0`/`1`, strings `true`/`false`/`1`/`0`         |
//! | `Value`  | anything                                                      |
//!
//! Any other combination is a `MappingError::Coercion`. Absent keys and JSON
//! null are both "no value".

use serde_json::{Map, Value};

use crate::error::{shape_name, MappingError};
use crate::instantiator::{ArrayOf, Instantiator, ResponseEntity, Single};

/// A decoded JSON object as exchanged with the provider.
pub type RawMap = Map<String, Value>;

/// Read-only wrapper around a `RawMap` with typed accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericContainer {
    data: RawMap,
}

impl GenericContainer {
    pub fn new(data: RawMap) -> Self {
        Self { data }
    }

    /// Raw value under `key`. JSON null is reported as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self.data.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    /// Value under `key` coerced to `T`.
    pub fn get_as<T: FromValue>(&self, key: &str) -> Result<Option<T>, MappingError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        T::from_value(value).map(Some).ok_or_else(|| MappingError::Coercion {
            key: key.to_string(),
            expected: T::NAME,
            found: shape_name(value),
        })
    }

    /// Like `get_as`, but absence is an error.
    pub fn require<T: FromValue>(&self, key: &str) -> Result<T, MappingError> {
        self.get_as(key)?
            .ok_or_else(|| MappingError::MissingField(key.to_string()))
    }

    /// Nested object under `key`. Scalars and arrays yield `None`.
    pub fn get_object(&self, key: &str) -> Option<GenericContainer> {
        match self.data.get(key) {
            Some(Value::Object(map)) => Some(Self::new(map.clone())),
            _ => None,
        }
    }

    /// Nested object under `key` built into `T`.
    pub fn entity<T: ResponseEntity>(&self, key: &str) -> Result<Option<T>, MappingError> {
        Instantiator::instantiate(&Single::<T>::new(), self.data.get(key).cloned())
    }

    /// Array of objects under `key` built into `Vec<T>`.
    pub fn entities<T: ResponseEntity>(&self, key: &str) -> Result<Option<Vec<T>>, MappingError> {
        Instantiator::instantiate(&ArrayOf::new(Single::<T>::new()), self.data.get(key).cloned())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn to_raw(&self) -> &RawMap {
        &self.data
    }

    pub fn into_raw(self) -> RawMap {
        self.data
    }
}

impl From<RawMap> for GenericContainer {
    fn from(data: RawMap) -> Self {
        Self::new(data)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for GenericContainer {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl TryFrom<Value> for GenericContainer {
    type Error = MappingError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(MappingError::Shape {
                expected: "object",
                found: shape_name(&other),
            }),
        }
    }
}

/// Explicit coercion from a JSON value into a primitive.
pub trait FromValue: Sized {
    /// Target name used in error messages.
    const NAME: &'static str;

    /// `None` when the value's shape is not an accepted source.
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const NAME: &'static str = "integer";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                let f = n.as_f64()?;
                (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for u32 {
    const NAME: &'static str = "unsigned integer";

    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|n| u32::try_from(n).ok())
    }
}

impl FromValue for f64 {
    const NAME: &'static str = "number";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const NAME: &'static str = "boolean";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromValue for Value {
    const NAME: &'static str = "any";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}
