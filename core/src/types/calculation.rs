use serde_json::Value;

use super::CargoPlace;
use crate::container::{GenericContainer, RawMap};
use crate::entity::{put, put_flag, put_list, put_opt, RequestEntity};
use crate::error::MappingError;
use crate::instantiator::ResponseEntity;

/// Price and delivery-term quote for a shipment between two cities.
#[derive(Debug, Clone, Default)]
pub struct CalculationRequest {
    extra: RawMap,
    sender_city: String,
    receiver_city: String,
    places: Vec<CargoPlace>,
    declared_value: Option<f64>,
    insurance: bool,
    pickup: bool,
    services: Vec<String>,
}

impl CalculationRequest {
    pub fn new(sender_city: impl Into<String>, receiver_city: impl Into<String>) -> Self {
        Self {
            sender_city: sender_city.into(),
            receiver_city: receiver_city.into(),
            ..Self::default()
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

    /// Insure the declared value. Sent only when `true`.
    pub fn set_insurance(&mut self, insurance: bool) -> &mut Self {
        self.insurance = insurance;
        self
    }

    /// Courier pickup from the sender's address. Sent only when `true`.
    pub fn set_pickup(&mut self, pickup: bool) -> &mut Self {
        self.pickup = pickup;
        self
    }

    pub fn add_service(&mut self, code: impl Into<String>) -> &mut Self {
        self.services.push(code.into());
        self
    }

    pub fn set_extra(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn places(&self) -> &[CargoPlace] {
        &self.places
    }

    pub fn insurance(&self) -> bool {
        self.insurance
    }
}

impl RequestEntity for CalculationRequest {
    fn to_raw(&self) -> RawMap {
        let mut map = self.extra.clone();
        put(&mut map, "senderCity", self.sender_city.as_str());
        put(&mut map, "receiverCity", self.receiver_city.as_str());
        put_list(&mut map, "cargo", &self.places);
        put_opt(&mut map, "declaredValue", self.declared_value);
        put_flag(&mut map, "insurance", self.insurance);
        put_flag(&mut map, "pickup", self.pickup);
        put_list(&mut map, "services", &self.services);
        map
    }
}

#[derive(Debug, Clone)]
pub struct CalculationResponse {
    price: f64,
    delivery_term: i64,
    currency: Option<String>,
    insurance: Option<Insurance>,
    services: Vec<ServiceCost>,
    raw: GenericContainer,
}

impl CalculationResponse {
    /// Total price including insurance and services.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Delivery term in days.
    pub fn delivery_term(&self) -> i64 {
        self.delivery_term
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn insurance(&self) -> Option<&Insurance> {
        self.insurance.as_ref()
    }

    pub fn services(&self) -> &[ServiceCost] {
        &self.services
    }

    pub fn raw(&self) -> &GenericContainer {
        &self.raw
    }
}

impl ResponseEntity for CalculationResponse {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            price: raw.require("price")?,
            delivery_term: raw.require("deliveryTerm")?,
            currency: raw.get_as("currency")?,
            insurance: raw.entity("insurance")?,
            services: raw.entities("services")?.unwrap_or_default(),
            raw,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insurance {
    pub price: f64,
    /// Percentage of the declared value.
    pub rate: Option<f64>,
}

impl ResponseEntity for Insurance {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            price: raw.require("price")?,
            rate: raw.get_as("rate")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCost {
    pub code: String,
    pub name: Option<String>,
    pub price: f64,
}

impl ResponseEntity for ServiceCost {
    fn from_raw(raw: RawMap) -> Result<Self, MappingError> {
        let raw = GenericContainer::new(raw);
        Ok(Self {
            code: raw.require("code")?,
            name: raw.get_as("name")?,
            price: raw.require("price")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::raw_map;
    use serde_json::json;

    fn request() -> CalculationRequest {
        let mut req = CalculationRequest::new("Moscow", "Kazan");
        req.add_place(CargoPlace::new(2.5, 30, 20, 10));
        req
    }

    #[test]
    fn minimal_request_omits_optional_keys() {
        assert_eq!(
            Value::Object(request().to_raw()),
            json!({
                "senderCity": "Moscow",
                "receiverCity": "Kazan",
                "cargo": [{"weight": 2.5, "length": 30, "width": 20, "height": 10}],
            })
        );
    }

    #[test]
    fn unset_and_false_flags_serialize_identically() {
        let unset = request();
        let mut explicit = request();
        explicit.set_insurance(false).set_pickup(false);

        let unset_raw = unset.to_raw();
        assert!(!unset_raw.contains_key("insurance"));
        assert!(!unset_raw.contains_key("pickup"));
        assert_eq!(unset_raw, explicit.to_raw());
    }

    #[test]
    fn set_flags_and_services_are_sent() {
        let mut req = request();
        req.set_insurance(true)
            .set_pickup(true)
            .set_declared_value(1500.0)
            .add_service("SMS")
            .add_service("FRAGILE");
        let raw = req.to_raw();
        assert_eq!(raw["insurance"], true);
        assert_eq!(raw["pickup"], true);
        assert_eq!(raw["declaredValue"], 1500.0);
        assert_eq!(raw["services"], json!(["SMS", "FRAGILE"]));
    }

    #[test]
    fn nan_declared_value_is_omitted() {
        let mut req = request();
        req.set_declared_value(f64::NAN);
        assert!(!req.to_raw().contains_key("declaredValue"));
    }

    #[test]
    fn to_raw_is_idempotent() {
        let mut req = request();
        req.set_insurance(true).set_extra("promoCode", "SPRING");
        assert_eq!(req.to_raw(), req.to_raw());
    }

    #[test]
    fn response_reads_fixture() {
        let resp = CalculationResponse::from_raw(raw_map(json!({"price": 123.45, "deliveryTerm": 3}))).unwrap();
        assert_eq!(resp.price(), 123.45);
        assert_eq!(resp.delivery_term(), 3);
        assert!(resp.insurance().is_none());
        assert!(resp.services().is_empty());
        assert!(resp.currency().is_none());
    }

    #[test]
    fn response_reads_nested_insurance_and_services() {
        let resp = CalculationResponse::from_raw(raw_map(json!({
            "price": "640.50",
            "deliveryTerm": "2",
            "currency": "RUB",
            "insurance": {"price": 15, "rate": 0.5},
            "services": [{"code": "SMS", "price": 10}],
            "zone": "B",
        })))
        .unwrap();
        assert_eq!(resp.price(), 640.5);
        assert_eq!(resp.delivery_term(), 2);
        assert_eq!(resp.insurance(), Some(&Insurance { price: 15.0, rate: Some(0.5) }));
        assert_eq!(resp.services()[0].code, "SMS");
        assert_eq!(resp.raw().get_as::<String>("zone").unwrap().as_deref(), Some("B"));
    }

    #[test]
    fn response_without_price_fails() {
        let err = CalculationResponse::from_raw(raw_map(json!({"deliveryTerm": 3}))).unwrap_err();
        assert_eq!(err, MappingError::MissingField("price".to_string()));
    }
}
