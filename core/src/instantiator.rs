//! Descriptor-driven construction of response entities.
//!
//! # Design
//! Each response type registers its constructor by implementing
//! `ResponseEntity::from_raw`, so the set of buildable types is known at
//! compile time. A `TypeDescriptor` says whether one entity (`Single<T>`) or
//! a sequence (`ArrayOf<D>`) is expected; `Instantiator` dispatches on it.
//! Absence (`None` or JSON null) at the top level is passed through as
//! `None` rather than producing an empty entity.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::container::RawMap;
use crate::error::{shape_name, MappingError};

/// A response type constructible from the raw object it was decoded from.
pub trait ResponseEntity: Sized {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Single,
    ArrayOf,
}

/// Describes the shape to build from a non-null JSON value.
pub trait TypeDescriptor {
    type Output;

    fn kind(&self) -> DescriptorKind;

    fn build(&self, data: Value) -> Result<Self::Output, MappingError>;
}

/// One `T` from one JSON object.
pub struct Single<T>(PhantomData<fn() -> T>);

impl<T> Single<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Single<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Single<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Single<T> {}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Single<{}>", std::any::type_name::<T>())
    }
}

impl<T: ResponseEntity> TypeDescriptor for Single<T> {
    type Output = T;

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::Single
    }

    fn build(&self, data: Value) -> Result<T, MappingError> {
        match data {
            Value::Object(map) => T::from_raw(map),
            other => Err(MappingError::Shape {
                expected: "object",
                found: shape_name(&other),
            }),
        }
    }
}

/// A `Vec` built element-wise from a JSON array with the wrapped descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayOf<D>(D);

impl<D> ArrayOf<D> {
    pub const fn new(element: D) -> Self {
        Self(element)
    }

    pub fn element(&self) -> &D {
        &self.0
    }
}

impl<D: TypeDescriptor> TypeDescriptor for ArrayOf<D> {
    type Output = Vec<D::Output>;

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::ArrayOf
    }

    fn build(&self, data: Value) -> Result<Self::Output, MappingError> {
        match data {
            Value::Array(items) => items.into_iter().map(|item| self.0.build(item)).collect(),
            other => Err(MappingError::Shape {
                expected: "array",
                found: shape_name(&other),
            }),
        }
    }
}

pub const fn single<T: ResponseEntity>() -> Single<T> {
    Single::new()
}

pub const fn array_of<T: ResponseEntity>() -> ArrayOf<Single<T>> {
    ArrayOf::new(Single::new())
}

/// Stateless factory turning decoded JSON into typed entities.
pub struct Instantiator;

impl Instantiator {
    pub fn instantiate<D: TypeDescriptor>(
        descriptor: &D,
        data: Option<Value>,
    ) -> Result<Option<D::Output>, MappingError> {
        match data {
            None | Some(Value::Null) => Ok(None),
            Some(value) => descriptor.build(value).map(Some),
        }
    }
}
