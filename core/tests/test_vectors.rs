//! Verify `build_post`/`parse_response` against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected mapping results or error kinds. Comparing parsed JSON (not
//! raw strings) avoids false negatives from field-ordering differences.

use serde_json::Value;
use shipping_core::endpoints::{CALCULATE_PATH, ORDER_HISTORY_PATH, ORDER_SEARCH_PATH};
use shipping_core::{
    array_of, single, ApiClient, ApiError, Body, CalculationRequest, CalculationResponse, CallMode,
    CargoPlace, ClientConfig, HttpRequest, HttpResponse, MappingError, OrderHistory,
    OrderHistoryRequest, OrderSearchRequest, OrderSearchResponse, OrderStatus, Transport,
    TransportError,
};

const BASE_URL: &str = "http://localhost:3000";

/// Vectors only exercise the build/parse halves; nothing is ever sent.
struct Offline;

impl Transport for Offline {
    fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Other("offline".to_string()))
    }
}

fn client() -> ApiClient<Offline> {
    ApiClient::with_transport(ClientConfig::new(BASE_URL).with_app_key("vec-app"), Offline)
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    let path = expected["path"].as_str().unwrap();
    assert_eq!(req.url, format!("{BASE_URL}{path}"), "{name}: path");
    assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");
    let body: Value = serde_json::from_str(&req.body).unwrap();
    assert_eq!(body, expected["body"], "{name}: body");
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_error(name: &str, err: &ApiError, expected: &str) {
    let ok = match expected {
        "BadRequest" => matches!(err, ApiError::BadRequest(bad) if !bad.errors.is_empty()),
        "Http" => matches!(err, ApiError::Http { .. }),
        "Deserialization" => matches!(err, ApiError::Deserialization(_)),
        "EmptyResponse" => matches!(err, ApiError::Mapping(MappingError::EmptyResponse)),
        "MissingField" => matches!(err, ApiError::Mapping(MappingError::MissingField(_))),
        "Coercion" => matches!(err, ApiError::Mapping(MappingError::Coercion { .. })),
        "Shape" => matches!(err, ApiError::Mapping(MappingError::Shape { .. })),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(ok, "{name}: expected {expected}, got {err:?}");
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Calculate
// ---------------------------------------------------------------------------

fn calculation_input(input: &Value) -> CalculationRequest {
    let mut req = CalculationRequest::new(
        input["senderCity"].as_str().unwrap(),
        input["receiverCity"].as_str().unwrap(),
    );
    let places: Vec<CargoPlace> = serde_json::from_value(input["cargo"].clone()).unwrap();
    for place in places {
        req.add_place(place);
    }
    if let Some(value) = input["declaredValue"].as_f64() {
        req.set_declared_value(value);
    }
    if let Some(flag) = input["insurance"].as_bool() {
        req.set_insurance(flag);
    }
    if let Some(flag) = input["pickup"].as_bool() {
        req.set_pickup(flag);
    }
    for service in input["services"].as_array().into_iter().flatten() {
        req.add_service(service.as_str().unwrap());
    }
    req
}

#[test]
fn calculate_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/calculate.json")) {
        let name = case["name"].as_str().unwrap();
        let input = calculation_input(&case["input"]);

        // Verify build, twice: serialization must not depend on call count.
        let req = c.build_post(CALCULATE_PATH, Body::from(&input), CallMode::Sync).unwrap();
        check_request(name, &req, &case["expected_request"]);
        let again = c.build_post(CALCULATE_PATH, Body::from(&input), CallMode::Sync).unwrap();
        assert_eq!(req.body, again.body, "{name}: idempotent body");

        // Verify parse
        let result = c.parse_response(simulated(&case), &single::<CalculationResponse>());
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }
        let quote = result.unwrap();
        let expected = &case["expected_result"];
        assert_eq!(quote.price(), expected["price"].as_f64().unwrap(), "{name}: price");
        assert_eq!(quote.delivery_term(), expected["deliveryTerm"].as_i64().unwrap(), "{name}: term");
        assert_eq!(quote.currency(), expected["currency"].as_str(), "{name}: currency");
        assert_eq!(
            quote.insurance().map(|i| i.price),
            expected["insurance"].as_f64(),
            "{name}: insurance"
        );
        assert_eq!(
            quote.services().len() as u64,
            expected["services"].as_u64().unwrap(),
            "{name}: services"
        );
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn search_input(input: &Value) -> OrderSearchRequest {
    let mut req = OrderSearchRequest::new();
    if let Some(page) = input["page"].as_u64() {
        req.set_page(page as u32);
    }
    if let Some(limit) = input["limit"].as_u64() {
        req.set_limit(limit as u32);
    }
    if let Some(flag) = input["withArchived"].as_bool() {
        req.set_with_archived(flag);
    }
    if let Some(status) = input["status"].as_str() {
        req.set_status(OrderStatus::from_code(status));
    }
    if let (Some(from), Some(to)) = (input["dateFrom"].as_str(), input["dateTo"].as_str()) {
        req.set_period(from, to);
    }
    req
}

#[test]
fn search_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/search.json")) {
        let name = case["name"].as_str().unwrap();
        let input = search_input(&case["input"]);

        let req = c.build_post(ORDER_SEARCH_PATH, Body::from(&input), CallMode::Sync).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_response(simulated(&case), &single::<OrderSearchResponse>());
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }
        let found = result.unwrap();
        let expected = &case["expected_result"];
        assert_eq!(found.total() as u64, expected["total"].as_u64().unwrap(), "{name}: total");
        assert_eq!(found.page() as u64, expected["page"].as_u64().unwrap(), "{name}: page");

        let orders: Vec<(&str, &str)> = found
            .orders()
            .iter()
            .map(|o| (o.order_id.as_str(), o.status.as_str()))
            .collect();
        let expected_orders: Vec<(&str, &str)> = expected["orders"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| (o["orderId"].as_str().unwrap(), o["status"].as_str().unwrap()))
            .collect();
        assert_eq!(orders, expected_orders, "{name}: orders");
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn history_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/history.json")) {
        let name = case["name"].as_str().unwrap();
        let ids: Vec<String> = serde_json::from_value(case["input"]["orderIds"].clone()).unwrap();
        let input = OrderHistoryRequest::new(ids);

        let req = c.build_post(ORDER_HISTORY_PATH, Body::from(&input), CallMode::Sync).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_response(simulated(&case), &array_of::<OrderHistory>());
        if let Some(expected_error) = case.get("expected_error") {
            check_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
            continue;
        }
        let history: Vec<(String, Vec<String>)> = result
            .unwrap()
            .into_iter()
            .map(|h| {
                let statuses = h.events.iter().map(|e| e.status.to_string()).collect();
                (h.order_id, statuses)
            })
            .collect();
        let expected: Vec<(String, Vec<String>)> = case["expected_result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let statuses = serde_json::from_value(h["events"].clone()).unwrap();
                (h["orderId"].as_str().unwrap().to_string(), statuses)
            })
            .collect();
        assert_eq!(history, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

#[test]
fn batch_request_is_an_array_on_the_async_path() {
    let c = client();
    let cases = load(include_str!("../../test-vectors/calculate.json"));
    let inputs: Vec<CalculationRequest> = cases.iter().take(2).map(|case| calculation_input(&case["input"])).collect();

    let req = c.build_post(CALCULATE_PATH, Body::batch(&inputs), CallMode::Async).unwrap();
    assert_eq!(req.url, format!("{BASE_URL}{CALCULATE_PATH}/async"));

    let body: Value = serde_json::from_str(&req.body).unwrap();
    let expected: Vec<Value> = cases.iter().take(2).map(|case| case["expected_request"]["body"].clone()).collect();
    assert_eq!(body, Value::Array(expected));
}
