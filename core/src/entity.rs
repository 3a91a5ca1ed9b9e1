//! Request side of the mapping layer.
//!
//! # Design
//! Requests keep their documented fields as typed members and anything else
//! in an `extra` map. `to_raw()` copies the extras and writes the typed
//! fields over them, so it never mutates the request and returns the same
//! map every time it is called.
//!
//! The provider distinguishes "field omitted" from "field present but
//! empty", so optional flags, empty lists and unset options are left out of
//! the wire map altogether. The `put_*` helpers implement that rule.

use serde::Serialize;
use serde_json::Value;

use crate::container::RawMap;

/// A request object that can be serialized into the provider's wire map.
pub trait RequestEntity {
    fn to_raw(&self) -> RawMap;
}

/// What `ApiClient::post` sends: one entity or a JSON array of them.
pub enum Body<'a> {
    Single(&'a dyn RequestEntity),
    Batch(Vec<&'a dyn RequestEntity>),
}

impl<'a> Body<'a> {
    pub fn batch<R: RequestEntity>(items: &'a [R]) -> Self {
        Body::Batch(items.iter().map(|item| item as &dyn RequestEntity).collect())
    }

    /// Serialized maps, one per entity.
    pub fn to_raw_maps(&self) -> Vec<RawMap> {
        match self {
            Body::Single(entity) => vec![entity.to_raw()],
            Body::Batch(entities) => entities.iter().map(|e| e.to_raw()).collect(),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Body::Batch(_))
    }
}

impl<'a, R: RequestEntity> From<&'a R> for Body<'a> {
    fn from(entity: &'a R) -> Self {
        Body::Single(entity)
    }
}

/// Always writes `value`.
pub(crate) fn put(map: &mut RawMap, key: &str, value: impl Into<Value>) {
    map.insert(key.to_string(), value.into());
}

/// Writes the key only when the flag is set.
pub(crate) fn put_flag(map: &mut RawMap, key: &str, flag: bool) {
    if flag {
        map.insert(key.to_string(), Value::Bool(true));
    }
}

/// Writes the key only for `Some` whose JSON form is not null. Non-finite
/// floats convert to null, so they are omitted too.
pub(crate) fn put_opt(map: &mut RawMap, key: &str, value: Option<impl Into<Value>>) {
    match value.map(Into::into) {
        None | Some(Value::Null) => {}
        Some(value) => {
            map.insert(key.to_string(), value);
        }
    }
}

/// Writes the list only when it has elements.
pub(crate) fn put_list<T: Serialize>(map: &mut RawMap, key: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    // Vec of serializable DTOs cannot fail to become a `Value`.
    if let Ok(value) = serde_json::to_value(items) {
        map.insert(key.to_string(), value);
    }
}
