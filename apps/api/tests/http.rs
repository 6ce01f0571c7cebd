//! End-to-end HTTP tests driving the router in process.
//!
//! Each test builds the full app against an in-memory database and sends
//! requests through `tower::ServiceExt::oneshot`, so status mapping, auth
//! extraction and JSON shapes are exercised exactly as a real caller would
//! see them.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tally_api::routes::{router, AppState};
use tally_api::JwtManager;
use tally_db::{Database, DbConfig};

const SECRET: &str = "test-secret";

async fn test_app() -> (Router, JwtManager) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let jwt = JwtManager::new(SECRET.to_string(), 3600);
    let app = router(AppState {
        db,
        jwt: jwt.clone(),
    });
    (app, jwt)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
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

async fn seed_product(app: &Router, token: &str, sell: i64, buy: i64, stock: i64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/products",
        Some(token),
        Some(json!({
            "name": format!("Product {sell}-{buy}"),
            "buy_price": buy,
            "sell_price": sell,
            "stock": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn seed_client(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/clients",
        Some(token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn missing_token_is_401() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let (app, _) = test_app().await;
    let (status, _) = send(&app, Method::GET, "/api/orders", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_token() {
    let (app, _) = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn cash_checkout_roundtrip() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 800, 500, 10).await;
    let client = seed_client(&app, &token, "Alice").await;

    let (status, order) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "client_id": client,
            "payment": "cash",
            "lines": [{ "product_id": product, "quantity": 3 }],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total_price"], 2400);
    assert_eq!(order["profit"], 900);
    assert_eq!(order["payment"], "cash");
    assert!(order["payment_date"].is_null());

    // Line details reflect the catalog at sale time
    let order_id = order["id"].as_str().unwrap();
    let (status, lines) = send(
        &app,
        Method::GET,
        &format!("/api/orders/{order_id}/lines"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(lines.as_array().unwrap().len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["sell_price"], 800);
}

#[tokio::test]
async fn insufficient_stock_is_409() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 100, 50, 2).await;
    let client = seed_client(&app, &token, "Alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "client_id": client,
            "payment": "cash",
            "lines": [{ "product_id": product, "quantity": 5 }],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    // Nothing was sold
    let (_, products) = send(&app, Method::GET, "/api/products", Some(&token), None).await;
    assert_eq!(products[0]["stock"], 2);
}

#[tokio::test]
async fn credit_lifecycle_and_balance() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 800, 500, 10).await;
    let client = seed_client(&app, &token, "Alice").await;

    let (_, order) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "client_id": client,
            "payment": "credit",
            "lines": [{ "product_id": product, "quantity": 2 }],
        })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    // Debt appears on the ledger
    let (_, clients) = send(&app, Method::GET, "/api/clients", Some(&token), None).await;
    assert_eq!(clients[0]["balance"], 1600);

    // Settle
    let (status, settled) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{order_id}/pay-credit"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settled["payment"], "credit_settled");
    assert!(!settled["payment_date"].is_null());

    // Debt cleared
    let (_, clients) = send(&app, Method::GET, "/api/clients", Some(&token), None).await;
    assert_eq!(clients[0]["balance"], 0);

    // Second settle is a conflict, not a double decrement
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{order_id}/pay-credit"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn list_filters_and_bad_state() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 100, 50, 100).await;
    let client = seed_client(&app, &token, "Alice").await;

    for payment in ["cash", "credit"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "client_id": client,
                "payment": payment,
                "lines": [{ "product_id": product, "quantity": 1 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send(&app, Method::GET, "/api/orders?state=all", Some(&token), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, credit) = send(
        &app,
        Method::GET,
        "/api/orders?state=credit",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(credit.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/orders?state=settled",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn walk_in_credit_is_rejected() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 100, 50, 10).await;

    let (status, walk_in) =
        send(&app, Method::GET, "/api/clients/walk-in", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(walk_in["is_walk_in"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "client_id": walk_in["id"],
            "payment": "credit",
            "lines": [{ "product_id": product, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

// =============================================================================
// Tenant isolation
// =============================================================================

#[tokio::test]
async fn tenants_cannot_see_each_other() {
    let (app, jwt) = test_app().await;
    let token_a = jwt.issue("tenant-a").unwrap();
    let token_b = jwt.issue("tenant-b").unwrap();

    let product = seed_product(&app, &token_a, 100, 50, 10).await;
    let client = seed_client(&app, &token_a, "Alice").await;

    let (_, order) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token_a),
        Some(json!({
            "client_id": client,
            "payment": "credit",
            "lines": [{ "product_id": product, "quantity": 1 }],
        })),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    // Tenant B sees an empty world and cannot settle A's order
    let (_, orders) = send(&app, Method::GET, "/api/orders", Some(&token_b), None).await;
    assert!(orders.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/orders/{order_id}/pay-credit"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn report_figures_and_day_close() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();
    let client = seed_client(&app, &token, "Alice").await;

    // cash 100/20, open credit 50/10, settled credit 30/5
    for (sell, buy, payment, settle) in [
        (100, 80, "cash", false),
        (50, 40, "credit", false),
        (30, 25, "credit", true),
    ] {
        let product = seed_product(&app, &token, sell, buy, 1).await;
        let (_, order) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({
                "client_id": client,
                "payment": payment,
                "lines": [{ "product_id": product, "quantity": 1 }],
            })),
        )
        .await;
        if settle {
            let order_id = order["id"].as_str().unwrap();
            send(
                &app,
                Method::PUT,
                &format!("/api/orders/{order_id}/pay-credit"),
                Some(&token),
                None,
            )
            .await;
        }
    }

    let (status, report) = send(&app, Method::GET, "/api/reports", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["cash"], 100);
    assert_eq!(report["cash_profit"], 20);
    assert_eq!(report["credit"], 50);
    assert_eq!(report["credit_paid"], 30);
    assert_eq!(report["credit_paid_profit"], 5);
    assert_eq!(report["total_sales"], 130);

    // Close the day
    let (status, snapshot) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(snapshot["total_sales"], 130);

    // Second close of the same day conflicts
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reports",
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    // One snapshot in history; open credit still listed
    let (_, history) = send(&app, Method::GET, "/api/reports/history", Some(&token), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (_, open) = send(
        &app,
        Method::GET,
        "/api/orders?state=credit",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(open.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn report_rejects_inverted_range() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/reports?start=2026-08-30&end=2026-08-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Catalog conflicts
// =============================================================================

#[tokio::test]
async fn referenced_product_delete_is_409() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 100, 50, 10).await;
    let client = seed_client(&app, &token, "Alice").await;

    send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({
            "client_id": client,
            "payment": "cash",
            "lines": [{ "product_id": product, "quantity": 1 }],
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/products/{product}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn stock_endpoint_rejects_negative() {
    let (app, jwt) = test_app().await;
    let token = jwt.issue("tenant-1").unwrap();

    let product = seed_product(&app, &token, 100, 50, 10).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{product}/stock"),
        Some(&token),
        Some(json!({ "stock": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{product}/stock"),
        Some(&token),
        Some(json!({ "stock": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 25);
}
