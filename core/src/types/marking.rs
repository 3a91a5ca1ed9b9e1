use serde_json::Value;

use crate::container::{GenericContainer, RawMap};
use crate::entity::{put, put_flag, put_opt, RequestEntity};
use crate::error::MappingError;
use crate::instantiator::ResponseEntity;

/// Assign barcodes to the cargo places of an order.
#[derive(Debug, Clone)]
pub struct MarkingRequest {
    extra: RawMap,
    order_id: String,
    places_count: Option<u32>,
    regenerate: bool,
}

impl MarkingRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            extra: RawMap::new(),
            order_id: order_id.into(),
            places_count: None,
            regenerate: false,
        }
    }

    /// Override the number of places recorded on the order.
    pub fn set_places_count(&mut self, count: u32) -> &mut Self {
        self.places_count = Some(count.max(1));
        self
    }

    /// Issue new barcodes even if the order is already marked.
    pub fn set_regenerate(&mut self, regenerate: bool) -> &mut Self {
        self.regenerate = regenerate;
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl RequestEntity for MarkingRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put(&mut map, "orderId", self.order_id.as_str());
        put_opt(&mut map, "placesCount", self.places_count);
        put_flag(&mut map, "regenerate", self.regenerate);
        map
    }
}

#[derive(Debug, Clone)]
pub struct MarkingResponse {
    order_id: String,
    marks: Vec<CargoMark>,
    raw: GenericContainer,
}

impl MarkingResponse {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn marks(&self) -> &[CargoMark] {
        &self.marks
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for MarkingResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            order_id: raw.require("orderId")?,
            marks: raw.entities("marks")?.unwrap_or_default(),
            raw,
        })
    }
}

/// Barcode of one cargo place; `place` counts from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoMark {
    pub place: u32,
    pub barcode: String,
}

impl ResponseEntity for CargoMark {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            place: raw.require("place")?,
            barcode: raw.require("barcode")?,
        })
    }
}
