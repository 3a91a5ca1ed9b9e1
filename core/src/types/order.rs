use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::CargoPlace;
use crate::container::{FromValue, GenericContainer, RawMap};
use crate::entity::{put, put_flag, put_list, put_opt, RequestEntity};
use crate::error::MappingError;
use crate::instantiator::ResponseEntity;

/// Largest page the search endpoint returns.
pub const MAX_PAGE_SIZE: u32 = 50;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Order lifecycle as reported by the provider. Codes the SDK does not know
/// are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Created,
    Accepted,
    InTransit,
    ReadyForPickup,
    Delivered,
    Cancelled,
    Returned,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Accepted => "accepted",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Returned => "returned",
            OrderStatus::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "created" => OrderStatus::Created,
            "accepted" => OrderStatus::Accepted,
            "in_transit" => OrderStatus::InTransit,
            "ready_for_pickup" => OrderStatus::ReadyForPickup,
            "delivered" => OrderStatus::Delivered,
            "cancelled" => OrderStatus::Cancelled,
            "returned" => OrderStatus::Returned,
            other => OrderStatus::Other(other.to_string()),
        }
    }

    /// Whether the order can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Returned
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromValue for OrderStatus {
    const NAME: &'static str = "order status";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(OrderStatus::from_code)
    }
}

/// Sender or receiver of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub phone: String,
    pub city: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Create a shipment order.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    extra: RawMap,
    number: String,
    sender: Party,
    receiver: Party,
    places: Vec<CargoPlace>,
    declared_value: Option<f64>,
    cash_on_delivery: Option<f64>,
    comment: Option<String>,
    insurance: bool,
    pickup: bool,
}

impl OrderRequest {
    /// `number` is the shop's own order reference.
    pub fn new(number: impl Into<String>, sender: Party, receiver: Party) -> Self {
        Self {
            extra: RawMap::new(),
            number: number.into(),
            sender,
            receiver,
            places: Vec::new(),
            declared_value: None,
            cash_on_delivery: None,
            comment: None,
            insurance: false,
            pickup: false,
        }
    }

    pub fn add_place(&mut self, place: CargoPlace) -> &mut Self {
        self.places.push(place);
        self
    }

    pub fn set_declared_value(&mut self, value: f64) -> &mut Self {
        self.declared_value = Some(value);
        self
    }

    /// Amount the courier collects from the receiver.
    pub fn set_cash_on_delivery(&mut self, amount: f64) -> &mut Self {
        self.cash_on_delivery = Some(amount);
        self
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn set_insurance(&mut self, insurance: bool) -> &mut Self {
        self.insurance = insurance;
        self
    }

    pub fn set_pickup(&mut self, pickup: bool) -> &mut Self {
        self.pickup = pickup;
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }
}

impl RequestEntity for OrderRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put(&mut map, "number", self.number.as_str());
        put(&mut map, "sender", party_value(&self.sender));
        put(&mut map, "receiver", party_value(&self.receiver));
        put_list(&mut map, "cargo", &self.places);
        put_opt(&mut map, "declaredValue", self.declared_value);
        put_opt(&mut map, "cashOnDelivery", self.cash_on_delivery);
        put_opt(&mut map, "comment", self.comment.as_deref());
        put_flag(&mut map, "insurance", self.insurance);
        put_flag(&mut map, "pickup", self.pickup);
        map
    }
}

fn party_value(party: &Party) -> Value {
    // Plain strings only, so this never fails.
    serde_json::to_value(party).unwrap_or(Value::Null)
}

#[derive(Debug, Clone)]
pub struct OrderCreated {
    order_id: String,
    barcode: Option<String>,
    status: OrderStatus,
    price: Option<f64>,
    raw: GenericContainer,
}

impl OrderCreated {
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for OrderCreated {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            order_id: raw.require("orderId")?,
            barcode: raw.get_as("barcode")?,
            status: raw.get_as("status")?.unwrap_or(OrderStatus::Created),
            price: raw.get_as("price")?,
            raw,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CancelRequest {
    extra: RawMap,
    order_id: String,
    reason: Option<String>,
}

impl CancelRequest {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            extra: RawMap::new(),
            order_id: order_id.into(),
            reason: None,
        }
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) -> &mut Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl RequestEntity for CancelRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put(&mut map, "orderId", self.order_id.as_str());
        put_opt(&mut map, "reason", self.reason.as_deref());
        map
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancelResponse {
    pub order_id: String,
    pub cancelled: bool,
    raw: GenericContainer,
}

impl CancelResponse {
    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for CancelResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            order_id: raw.require("orderId")?,
            cancelled: raw.get_as("cancelled")?.unwrap_or(false),
            raw,
        })
    }
}

/// Paged order search. Page size is silently clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone)]
pub struct OrderSearchRequest {
    extra: RawMap,
    date_from: Option<String>,
    date_to: Option<String>,
    status: Option<OrderStatus>,
    number: Option<String>,
    page: u32,
    limit: u32,
    with_archived: bool,
}

impl Default for OrderSearchRequest {
    fn default() -> Self {
        Self {
            extra: RawMap::new(),
            date_from: None,
            date_to: None,
            status: None,
            number: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            with_archived: false,
        }
    }
}

impl OrderSearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive date range, `YYYY-MM-DD`.
    pub fn set_period(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.date_from = Some(from.into());
        self.date_to = Some(to.into());
        self
    }

    pub fn set_status(&mut self, status: OrderStatus) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn set_number(&mut self, number: impl Into<String>) -> &mut Self {
        self.number = Some(number.into());
        self
    }

    /// Pages start at 1; 0 is treated as 1.
    pub fn set_page(&mut self, page: u32) -> &mut Self {
        self.page = page.max(1);
        self
    }

    pub fn set_limit(&mut self, limit: u32) -> &mut Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn set_with_archived(&mut self, with_archived: bool) -> &mut Self {
        self.with_archived = with_archived;
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl RequestEntity for OrderSearchRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put_opt(&mut map, "dateFrom", self.date_from.as_deref());
        put_opt(&mut map, "dateTo", self.date_to.as_deref());
        put_opt(&mut map, "status", self.status.as_ref().map(OrderStatus::as_str));
        put_opt(&mut map, "number", self.number.as_deref());
        put(&mut map, "page", self.page);
        put(&mut map, "limit", self.limit);
        put_flag(&mut map, "withArchived", self.with_archived);
        map
    }
}

#[derive(Debug, Clone)]
pub struct OrderSearchResponse {
    total: u32,
    page: u32,
    orders: Vec<OrderSummary>,
    raw: GenericContainer,
}

impl OrderSearchResponse {
    /// Matches across all pages.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn orders(&self) -> &[OrderSummary] {
        &self.orders
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for OrderSearchResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        let orders: Vec<OrderSummary> = raw.entities("orders")?.unwrap_or_default();
        Ok(Self {
            total: raw.get_as("total")?.unwrap_or(orders.len() as u32),
            page: raw.get_as("page")?.unwrap_or(1),
            orders,
            raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order_id: String,
    pub number: Option<String>,
    pub status: OrderStatus,
    pub created_at: Option<String>,
    pub receiver_city: Option<String>,
    raw: GenericContainer,
}

impl OrderSummary {
    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for OrderSummary {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            order_id: raw.require("orderId")?,
            number: raw.get_as("number")?,
            status: raw.require("status")?,
            created_at: raw.get_as("createdAt")?,
            receiver_city: raw.get_as("receiverCity")?,
            raw,
        })
    }
}

/// Status history for one or more orders.
#[derive(Debug, Clone, Default)]
pub struct OrderHistoryRequest {
    extra: RawMap,
    order_ids: Vec<String>,
}

impl OrderHistoryRequest {
    pub fn new<I, S>(order_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order_ids: order_ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn add_order(&mut self, order_id: impl Into<String>) -> &mut Self {
        self.order_ids.push(order_id.into());
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl RequestEntity for OrderHistoryRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put_list(&mut map, "orderIds", &self.order_ids);
        map
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderHistory {
    pub order_id: String,
    pub events: Vec<StatusEvent>,
    raw: GenericContainer,
}

impl OrderHistory {
    /// Most recent event, assuming the provider's chronological order.
    pub fn current(&self) -> Option<&StatusEvent> {
        self.events.last()
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for OrderHistory {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            order_id: raw.require("orderId")?,
            events: raw.entities("events")?.unwrap_or_default(),
            raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub status: OrderStatus,
    pub date: String,
    pub city: Option<String>,
    pub comment: Option<String>,
}

impl ResponseEntity for StatusEvent {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            status: raw.require("status")?,
            date: raw.require("date")?,
            city: raw.get_as("city")?,
            comment: raw.get_as("comment")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::raw_map;
    use serde_json::json;

    fn party(city: &str) -> Party {
        Party {
            name: "Ivan".to_string(),
            phone: "+79990000000".to_string(),
            city: city.to_string(),
            address: "Lenina 1".to_string(),
            email: None,
        }
    }

    #[test]
    fn order_request_serializes_parties_and_cargo() {
        let mut req = OrderRequest::new("SHOP-1", party("Moscow"), party("Kazan"));
        req.add_place(CargoPlace::new(1.0, 10, 10, 10)).set_cash_on_delivery(990.0);
        let raw = req.to_raw();
        assert_eq!(raw["number"], "SHOP-1");
        assert_eq!(raw["sender"]["city"], "Moscow");
        assert!(raw["receiver"].get("email").is_none());
        assert_eq!(raw["cargo"].as_array().unwrap().len(), 1);
        assert_eq!(raw["cashOnDelivery"], 990.0);
        assert!(!raw.contains_key("insurance"));
        assert!(!raw.contains_key("comment"));
    }

    #[test]
    fn page_size_is_clamped() {
        let mut req = OrderSearchRequest::new();
        req.set_limit(999);
        assert_eq!(req.limit(), MAX_PAGE_SIZE);
        req.set_limit(10);
        assert_eq!(req.limit(), 10);
        req.set_limit(0);
        assert_eq!(req.limit(), 1);
        req.set_page(0);
        assert_eq!(req.page(), 1);
    }

    #[test]
    fn search_defaults_serialize_paging_only() {
        assert_eq!(
            Value::Object(OrderSearchRequest::new().to_raw()),
            json!({"page": 1, "limit": 20})
        );
    }

    #[test]
    fn with_archived_is_sent_only_when_set() {
        let mut req = OrderSearchRequest::new();
        req.set_with_archived(false);
        assert!(!req.to_raw().contains_key("withArchived"));
        req.set_with_archived(true).set_status(OrderStatus::InTransit);
        let raw = req.to_raw();
        assert_eq!(raw["withArchived"], true);
        assert_eq!(raw["status"], "in_transit");
    }

    #[test]
    fn status_codes_round_trip_and_keep_unknowns() {
        assert_eq!(OrderStatus::from_code("delivered"), OrderStatus::Delivered);
        assert_eq!(OrderStatus::ReadyForPickup.as_str(), "ready_for_pickup");
        let odd = OrderStatus::from_code("held_at_customs");
        assert_eq!(odd, OrderStatus::Other("held_at_customs".to_string()));
        assert_eq!(odd.to_string(), "held_at_customs");
        assert!(OrderStatus::Returned.is_final());
        assert!(!OrderStatus::Accepted.is_final());
    }

    #[test]
    fn search_response_builds_summaries() {
        let resp = OrderSearchResponse::from_raw(raw_map(json!({
            "total": 31,
            "page": 2,
            "orders": [
                {"orderId": "A1", "status": "created", "number": "S-1"},
                {"orderId": "A2", "status": "delivered", "receiverCity": "Omsk"},
            ],
        })))
        .unwrap();
        assert_eq!(resp.total(), 31);
        assert_eq!(resp.page(), 2);
        assert_eq!(resp.orders().len(), 2);
        assert_eq!(resp.orders()[1].status, OrderStatus::Delivered);
        assert_eq!(resp.orders()[1].receiver_city.as_deref(), Some("Omsk"));
    }

    #[test]
    fn summary_with_numeric_status_fails() {
        let err = OrderSummary::from_raw(raw_map(json!({"orderId": "A1", "status": 3}))).unwrap_err();
        assert!(matches!(err, MappingError::Coercion { .. }));
    }

    #[test]
    fn history_request_omits_empty_ids() {
        assert!(OrderHistoryRequest::default().to_raw().is_empty());
        let req = OrderHistoryRequest::new(["A1", "A2"]);
        assert_eq!(req.to_raw()["orderIds"], json!(["A1", "A2"]));
    }

    #[test]
    fn history_events_keep_order() {
        let history = OrderHistory::from_raw(raw_map(json!({
            "orderId": "A1",
            "events": [
                {"status": "created", "date": "2026-10-01T09:00:00Z"},
                {"status": "in_transit", "date": "2026-10-02T09:00:00Z", "city": "Tver"},
            ],
        })))
        .unwrap();
        assert_eq!(history.events.len(), 2);
        assert_eq!(history.current().unwrap().status, OrderStatus::InTransit);
        assert_eq!(history.current().unwrap().city.as_deref(), Some("Tver"));
    }

    #[test]
    fn created_defaults_status() {
        let created = OrderCreated::from_raw(raw_map(json!({"orderId": "A9", "barcode": "100200"}))).unwrap();
        assert_eq!(created.order_id(), "A9");
        assert_eq!(created.status(), &OrderStatus::Created);
        assert_eq!(created.barcode(), Some("100200"));
        assert!(created.price().is_none());
    }

    #[test]
    fn extras_pass_through_and_typed_fields_win() {
        let mut cancel = CancelRequest::new("A1");
        cancel.set_extra("notifyReceiver", true).set_extra("orderId", "stale");
        let raw = cancel.to_raw();
        assert_eq!(raw["notifyReceiver"], true);
        assert_eq!(raw["orderId"], "A1");

        let mut search = OrderSearchRequest::new();
        search.set_extra("sort", "createdAt").set_extra("limit", 500).set_limit(5);
        assert_eq!(
            Value::Object(search.to_raw()),
            json!({"sort": "createdAt", "page": 1, "limit": 5})
        );

        let mut history = OrderHistoryRequest::new(["A1"]);
        history.set_extra("lang", "en");
        assert_eq!(
            Value::Object(history.to_raw()),
            json!({"lang": "en", "orderIds": ["A1"]})
        );
    }

    #[test]
    fn responses_keep_unmodelled_fields() {
        let resp = OrderSearchResponse::from_raw(raw_map(json!({
            "total": 1,
            "orders": [{"orderId": "A1", "status": "created", "tariff": 136}],
            "nextCursor": "c2",
        })))
        .unwrap();
        assert_eq!(resp.raw().get_as::<String>("nextCursor").unwrap().as_deref(), Some("c2"));
        assert_eq!(resp.orders()[0].raw().get_as::<i64>("tariff").unwrap(), Some(136));

        let cancel = CancelResponse::from_raw(raw_map(json!({
            "orderId": "A1",
            "cancelled": true,
            "refund": 120.5,
        })))
        .unwrap();
        assert!(cancel.cancelled);
        assert_eq!(cancel.raw().get_as::<f64>("refund").unwrap(), Some(120.5));

        let history = OrderHistory::from_raw(raw_map(json!({
            "orderId": "A1",
            "events": [],
            "trackingUrl": "https://track.example/A1",
        })))
        .unwrap();
        assert!(history.raw().contains_key("trackingUrl"));
    }
}
