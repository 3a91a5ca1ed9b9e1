//! Request and response DTOs for the provider's operations.
//!
//! # Design
//! Requests hold the documented fields as typed members plus an `extra` map
//! for anything the SDK does not model; `to_raw()` merges the two. Responses
//! validate and extract their documented fields in `from_raw` and keep the
//! full object in a `GenericContainer`, reachable through `raw()`, for the
//! rest.

pub mod auth;
pub mod calculation;
pub mod marking;
pub mod order;
pub mod printing;

use serde::{Deserialize, Serialize};

pub use auth::{AuthRequest, AuthResponse};
pub use calculation::{CalculationRequest, CalculationResponse, Insurance, ServiceCost};
pub use marking::{CargoMark, MarkingRequest, MarkingResponse};
pub use order::{
    CancelRequest, CancelResponse, OrderCreated, OrderHistory, OrderHistoryRequest, OrderRequest,
    OrderSearchRequest, OrderSearchResponse, OrderStatus, OrderSummary, Party, StatusEvent,
    MAX_PAGE_SIZE,
};
pub use printing::{LabelFormat, PrintRequest, PrintResponse};

/// One physical cargo place. Weight in kilograms, dimensions in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoPlace {
    pub weight: f64,
    pub length: u32,
    pub width: u32,
    pub height: u32,
}

impl CargoPlace {
    pub fn new(weight: f64, length: u32, width: u32, height: u32) -> Self {
        Self {
            weight,
            length,
            width,
            height,
        }
    }
}

#[cfg(test)]
pub(crate) fn raw_map(value: serde_json::Value) -> crate::container::RawMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture is not an object: {other}"),
    }
}
