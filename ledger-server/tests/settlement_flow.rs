//! End-to-end settlement flow through the HTTP API.
//!
//! Drives the real router against an in-memory ledger: create orders,
//! settle payments, inspect balances and error envelopes.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use ledger_server::{Config, Server, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config::with_overrides("unused", 0);
    let state = ServerState::in_memory(config).expect("in-memory ledger");
    Server::build_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_order(app: &Router, side: &str, items: Value) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/orders",
        Some(json!({
            "side": side,
            "counterparty_id": "supplier-42",
            "items": items,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create order failed: {body}");
    body
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn full_settlement_lifecycle() {
    let app = app();

    let order = create_order(
        &app,
        "purchase",
        json!([
            {"name": "steel coils", "quantity": 1, "unit_price": 100.0, "delivery_date": "2025-02-01"},
            {"name": "copper wire", "quantity": 1, "unit_price": 50.0, "delivery_date": "2025-03-01"},
        ]),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();
    assert_eq!(order["outstanding_total"], 150.0);
    assert_eq!(order["status"], "PENDING");

    // Partial payment: earliest delivery absorbs first
    let (status, outcome) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({
            "order_ids": [order_id],
            "payment": {"cash": 120.0},
            "mode": "automatic",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "settlement failed: {outcome}");
    assert_eq!(outcome["applied"], 120.0);
    assert_eq!(outcome["unapplied"], 0.0);
    assert_eq!(outcome["payments"].as_array().unwrap().len(), 1);

    let (_, detail) = send(&app, "GET", &format!("/api/orders/{order_id}"), None).await;
    assert_eq!(detail["outstanding_total"], 30.0);
    assert_eq!(detail["status"], "PENDING");
    let items = detail["items"].as_array().unwrap();
    // Items come back in delivery-date order
    assert_eq!(items[0]["outstanding_price"], 0.0);
    assert_eq!(items[1]["outstanding_price"], 30.0);

    // Aggregate outstanding reflects the partial payment
    let (_, summary) = send(&app, "GET", "/api/cashier/outstanding?side=purchase", None).await;
    assert_eq!(summary["outstanding_total"], 30.0);
    assert_eq!(summary["open_orders"], 1);

    // Remainder paid by card: order settles and delivers
    let (status, outcome) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({
            "order_ids": [order_id],
            "payment": {"card": 30.0},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["settled_order_ids"], json!([order_id]));

    let (_, detail) = send(&app, "GET", &format!("/api/orders/{order_id}"), None).await;
    assert_eq!(detail["outstanding_total"], 0.0);
    assert_eq!(detail["status"], "DELIVERED");
    let payments = detail["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    let total_paid: f64 = payments.iter().map(|p| p["amount"].as_f64().unwrap()).sum();
    assert_eq!(total_paid, 150.0);

    let (_, summary) = send(&app, "GET", "/api/cashier/outstanding?side=purchase", None).await;
    assert_eq!(summary["outstanding_total"], 0.0);
    assert_eq!(summary["open_orders"], 0);
}

#[tokio::test]
async fn multi_order_multi_instrument_settlement() {
    let app = app();

    let a = create_order(
        &app,
        "sales",
        json!([{"name": "unit A", "quantity": 1, "unit_price": 60.0, "delivery_date": "2025-01-10"}]),
    )
    .await;
    let b = create_order(
        &app,
        "sales",
        json!([{"name": "unit B", "quantity": 1, "unit_price": 40.0, "delivery_date": "2025-01-20"}]),
    )
    .await;
    let a_id = a["id"].as_str().unwrap();
    let b_id = b["id"].as_str().unwrap();

    let (status, outcome) = send(
        &app,
        "POST",
        "/api/cashier/sales-settlements",
        Some(json!({
            "order_ids": [a_id, b_id],
            "payment": {"cash": 50.0, "card": 50.0},
            "mode": "manual",
            "operator_id": "till-3",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "settlement failed: {outcome}");
    assert_eq!(outcome["applied"], 100.0);

    // Cash drains into A first, card bridges A and pays B
    let payments = outcome["payments"].as_array().unwrap();
    let split: Vec<(&str, &str, f64)> = payments
        .iter()
        .map(|p| {
            (
                p["order_id"].as_str().unwrap(),
                p["instrument"].as_str().unwrap(),
                p["amount"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        split,
        vec![
            (a_id, "cash", 50.0),
            (a_id, "card", 10.0),
            (b_id, "card", 40.0),
        ]
    );
    assert!(payments.iter().all(|p| p["operator_id"] == "till-3"));

    // Sales orders settle without a status transition
    let (_, detail) = send(&app, "GET", &format!("/api/orders/{a_id}"), None).await;
    assert_eq!(detail["outstanding_total"], 0.0);
    assert_eq!(detail["status"], "PENDING");
}

#[tokio::test]
async fn overpayment_reported_but_not_recorded() {
    let app = app();

    let order = create_order(
        &app,
        "purchase",
        json!([{"name": "pallets", "quantity": 1, "unit_price": 50.0, "delivery_date": "2025-01-01"}]),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, outcome) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({
            "order_ids": [order_id],
            "payment": {"cash": 80.0},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["applied"], 50.0);
    assert_eq!(outcome["unapplied"], 30.0);

    let (_, detail) = send(&app, "GET", &format!("/api/orders/{order_id}"), None).await;
    let payments = detail["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], 50.0);
}

#[tokio::test]
async fn validation_errors_use_the_error_envelope() {
    let app = app();

    // Empty order list
    let (status, body) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({"order_ids": [], "payment": {"cash": 10.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    // No positive instrument amount
    let (status, body) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({"order_ids": ["some-id"], "payment": {"cash": 0.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");
}

#[tokio::test]
async fn unknown_order_returns_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({"order_ids": ["ghost"], "payment": {"cash": 10.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E0003");
}

#[tokio::test]
async fn settling_an_already_settled_order_is_rejected() {
    let app = app();

    let order = create_order(
        &app,
        "purchase",
        json!([{"name": "crates", "quantity": 2, "unit_price": 15.0, "delivery_date": "2025-01-01"}]),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({"order_ids": [order_id], "payment": {"cheque": 30.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/cashier/purchase-settlements",
        Some(json!({"order_ids": [order_id], "payment": {"cash": 5.0}})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "E0005");
}

#[tokio::test]
async fn order_creation_validates_items() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({"side": "purchase", "counterparty_id": "s-1", "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({
            "side": "purchase",
            "counterparty_id": "s-1",
            "items": [{"name": "x", "quantity": 0, "unit_price": 10.0, "delivery_date": "2025-01-01"}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(json!({
            "side": "purchase",
            "counterparty_id": "s-1",
            "items": [{"name": "x", "quantity": 1, "unit_price": 10.0, "delivery_date": "01-2025-01"}],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
