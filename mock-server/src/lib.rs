use std::{collections::HashSet, sync::Arc};

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const LOGIN: &str = "demo";
pub const PASSWORD: &str = "demo-password";
pub const SESSION_HEADER: &str = "x-session-id";

const BASE_PRICE: f64 = 250.0;
const PRICE_PER_KG: f64 = 40.0;
const PICKUP_PRICE: f64 = 150.0;
const SERVICE_PRICE: f64 = 30.0;
const INSURANCE_RATE: f64 = 0.5;
const MAX_PAGE_SIZE: usize = 50;
const EVENT_DATE: &str = "2026-10-17T09:00:00Z";

const PDF_STUB: &str = "JVBERi0xLjQK";
const ZPL_STUB: &str = "XlhBXlha";

#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub status: String,
    pub date: String,
    pub city: String,
}

#[derive(Clone, Debug)]
pub struct Order {
    pub order_id: String,
    pub number: String,
    pub status: String,
    pub receiver_city: String,
    pub places: usize,
    pub price: f64,
    pub events: Vec<Event>,
    pub marks: Vec<Value>,
}

#[derive(Debug, Default)]
pub struct Store {
    sessions: HashSet<String>,
    orders: Vec<Order>,
    next_barcode: u64,
}

impl Store {
    fn order_mut(&mut self, order_id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.order_id == order_id)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/login", post(login))
        .route("/calculator/calculate", post(calculate))
        .route("/calculator/calculate/async", post(calculate_async))
        .route("/orders/create", post(create_order))
        .route("/orders/cancel", post(cancel_order))
        .route("/orders/search", post(search_orders))
        .route("/orders/history", post(order_history))
        .route("/marking/cargo", post(mark_cargo))
        .route("/print/labels", post(print_labels))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Vendor error envelope. The provider sends these with HTTP 200.
pub fn envelope(code: &str, message: &str) -> Value {
    json!({"errors": [{"code": code, "message": message}]})
}

fn field_error(field: &str, message: &str) -> Value {
    json!({"errors": [{"code": "VALIDATION", "field": field, "message": message}]})
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Value> {
    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| envelope("SESSION_REQUIRED", "session id header is missing"))?;
    if db.read().await.sessions.contains(session) {
        Ok(())
    } else {
        Err(envelope("SESSION_EXPIRED", "unknown or expired session"))
    }
}

fn respond(result: Result<Value, Value>) -> Json<Value> {
    Json(result.unwrap_or_else(|errors| errors))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn str_field<'a>(input: &'a Value, key: &str) -> Option<&'a str> {
    input.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_true(input: &Value, key: &str) -> bool {
    input.get(key) == Some(&Value::Bool(true))
}

async fn login(State(db): State<Db>, Json(input): Json<Value>) -> Json<Value> {
    let login = input.get("login").and_then(Value::as_str);
    let password = input.get("password").and_then(Value::as_str);
    if login != Some(LOGIN) || password != Some(PASSWORD) {
        info!(?login, "login rejected");
        return Json(envelope("AUTH_FAILED", "invalid login or password"));
    }
    let session_id = Uuid::new_v4().to_string();
    db.write().await.sessions.insert(session_id.clone());
    info!(%session_id, "session opened");
    Json(json!({"sessionId": session_id, "expiresAt": "2026-10-18T09:00:00Z"}))
}

/// Price a shipment described with calculator field names.
fn quote(input: &Value) -> Result<Value, Value> {
    let sender = str_field(input, "senderCity")
        .ok_or_else(|| field_error("senderCity", "sender city is required"))?;
    let receiver = str_field(input, "receiverCity")
        .ok_or_else(|| field_error("receiverCity", "receiver city is required"))?;
    let cargo = input
        .get("cargo")
        .and_then(Value::as_array)
        .filter(|places| !places.is_empty())
        .ok_or_else(|| field_error("cargo", "at least one cargo place is required"))?;

    let weight: f64 = cargo
        .iter()
        .filter_map(|place| place.get("weight").and_then(Value::as_f64))
        .sum();
    let mut price = BASE_PRICE + PRICE_PER_KG * weight;
    let mut quote = json!({
        "deliveryTerm": if sender == receiver { 1 } else { 3 },
        "currency": "RUB",
    });

    if is_true(input, "insurance") {
        let declared = input.get("declaredValue").and_then(Value::as_f64).unwrap_or(0.0);
        let cost = round2(declared * INSURANCE_RATE / 100.0);
        price += cost;
        quote["insurance"] = json!({"price": cost, "rate": INSURANCE_RATE});
    }
    if is_true(input, "pickup") {
        price += PICKUP_PRICE;
    }
    if let Some(codes) = input.get("services").and_then(Value::as_array) {
        let services: Vec<Value> = codes
            .iter()
            .filter_map(Value::as_str)
            .map(|code| json!({"code": code, "price": SERVICE_PRICE}))
            .collect();
        price += SERVICE_PRICE * services.len() as f64;
        quote["services"] = Value::Array(services);
    }
    quote["price"] = json!(round2(price));
    Ok(quote)
}

async fn calculate(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    let result = match authorize(&db, &headers).await {
        Ok(()) => quote(&input),
        Err(errors) => Err(errors),
    };
    respond(result)
}

async fn calculate_async(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let Some(items) = input.as_array() else {
        return Json(envelope("VALIDATION", "batch body must be an array"));
    };
    let quotes: Result<Vec<Value>, Value> = items.iter().map(quote).collect();
    respond(quotes.map(Value::Array))
}

async fn create_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let Some(number) = str_field(&input, "number") else {
        return Json(field_error("number", "order number is required"));
    };
    let city = |party: &str| input.get(party).and_then(|p| str_field(p, "city")).map(str::to_string);
    let calc = json!({
        "senderCity": city("sender"),
        "receiverCity": city("receiver"),
        "cargo": input.get("cargo"),
        "declaredValue": input.get("declaredValue"),
        "insurance": input.get("insurance"),
        "pickup": input.get("pickup"),
    });
    let quoted = match quote(&calc) {
        Ok(q) => q,
        Err(errors) => return Json(errors),
    };

    let mut store = db.write().await;
    if store.orders.iter().any(|o| o.number == number) {
        return Json(envelope("DUPLICATE_NUMBER", "an order with this number already exists"));
    }
    store.next_barcode += 1;
    let order = Order {
        order_id: Uuid::new_v4().to_string(),
        number: number.to_string(),
        status: "created".to_string(),
        receiver_city: city("receiver").unwrap_or_default(),
        places: input.get("cargo").and_then(Value::as_array).map_or(0, Vec::len),
        price: quoted["price"].as_f64().unwrap_or_default(),
        events: vec![Event {
            status: "created".to_string(),
            date: EVENT_DATE.to_string(),
            city: city("sender").unwrap_or_default(),
        }],
        marks: Vec::new(),
    };
    let reply = json!({
        "orderId": order.order_id,
        "barcode": format!("10{:010}", store.next_barcode),
        "status": order.status,
        "price": order.price,
    });
    info!(order_id = %order.order_id, number, "order created");
    store.orders.push(order);
    Json(reply)
}

async fn cancel_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let order_id = str_field(&input, "orderId").unwrap_or_default();
    let mut store = db.write().await;
    let Some(order) = store.order_mut(order_id) else {
        return Json(envelope("NOT_FOUND", "order not found"));
    };
    if order.status == "cancelled" || order.status == "delivered" {
        return Json(envelope("INVALID_STATE", "order can no longer be cancelled"));
    }
    order.status = "cancelled".to_string();
    order.events.push(Event {
        status: "cancelled".to_string(),
        date: EVENT_DATE.to_string(),
        city: String::new(),
    });
    Json(json!({"orderId": order.order_id, "cancelled": true}))
}

async fn search_orders(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let status = str_field(&input, "status");
    let number = str_field(&input, "number");
    let with_archived = is_true(&input, "withArchived");
    let page = input.get("page").and_then(Value::as_u64).unwrap_or(1).max(1) as usize;
    let limit = input
        .get("limit")
        .and_then(Value::as_u64)
        .map_or(20, |l| (l as usize).clamp(1, MAX_PAGE_SIZE));

    let store = db.read().await;
    let matching: Vec<&Order> = store
        .orders
        .iter()
        .filter(|o| with_archived || o.status != "cancelled")
        .filter(|o| status.map_or(true, |s| o.status == s))
        .filter(|o| number.map_or(true, |n| o.number == n))
        .collect();
    let orders: Vec<Value> = matching
        .iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .map(|o| {
            json!({
                "orderId": o.order_id,
                "number": o.number,
                "status": o.status,
                "createdAt": EVENT_DATE,
                "receiverCity": o.receiver_city,
            })
        })
        .collect();
    Json(json!({"total": matching.len(), "page": page, "orders": orders}))
}

async fn order_history(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let ids: Vec<&str> = input
        .get("orderIds")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let store = db.read().await;
    let mut histories = Vec::with_capacity(ids.len());
    for id in ids {
        let Some(order) = store.orders.iter().find(|o| o.order_id == id) else {
            return Json(envelope("NOT_FOUND", &format!("order {id} not found")));
        };
        histories.push(json!({"orderId": order.order_id, "events": order.events}));
    }
    Json(Value::Array(histories))
}

async fn mark_cargo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let order_id = str_field(&input, "orderId").unwrap_or_default();
    let regenerate = is_true(&input, "regenerate");
    let mut store = db.write().await;
    let Some(index) = store.orders.iter().position(|o| o.order_id == order_id) else {
        return Json(envelope("NOT_FOUND", "order not found"));
    };
    if store.orders[index].marks.is_empty() || regenerate {
        let places = input
            .get("placesCount")
            .and_then(Value::as_u64)
            .map_or(store.orders[index].places, |n| n as usize)
            .max(1);
        let mut marks = Vec::with_capacity(places);
        for place in 1..=places {
            store.next_barcode += 1;
            marks.push(json!({"place": place, "barcode": format!("46{:011}", store.next_barcode)}));
        }
        store.orders[index].marks = marks;
    }
    let order = &store.orders[index];
    Json(json!({"orderId": order.order_id, "marks": order.marks}))
}

async fn print_labels(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Json<Value> {
    if let Err(errors) = authorize(&db, &headers).await {
        return Json(errors);
    }
    let ids: Vec<&str> = input
        .get("orderIds")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if ids.is_empty() {
        return Json(field_error("orderIds", "at least one order id is required"));
    }
    let store = db.read().await;
    if let Some(missing) = ids.iter().find(|id| !store.orders.iter().any(|o| o.order_id == **id)) {
        return Json(envelope("NOT_FOUND", &format!("order {missing} not found")));
    }
    let (format, content) = match str_field(&input, "format").unwrap_or("pdf") {
        "zpl" => ("zpl", ZPL_STUB),
        _ => ("pdf", PDF_STUB),
    };
    Json(json!({"format": format, "content": content, "pages": ids.len()}))
}
