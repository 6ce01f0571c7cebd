//! # Route Handlers
//!
//! HTTP surface of the Settlement API.
//!
//! ## Route Map
//! ```text
//! POST   /api/orders                  create order (201)
//! GET    /api/orders                  list (?state=all|paid|credit&client_id=)
//! PUT    /api/orders/{id}/pay-credit  settle credit
//! GET    /api/orders/{id}/lines       line details
//!
//! GET    /api/reports                 period figures (?start=&end=)
//! POST   /api/reports                 close day (201)
//! GET    /api/reports/history         past snapshots
//!
//! GET    /api/products                list (?name= substring filter)
//! POST   /api/products                create (201)
//! PUT    /api/products/{id}           partial update
//! PUT    /api/products/{id}/stock     set stock level
//! DELETE /api/products/{id}           delete (204; 409 while referenced)
//!
//! GET    /api/clients                 list
//! POST   /api/clients                 create (201)
//! GET    /api/clients/walk-in         walk-in client (created on demand)
//! DELETE /api/clients/{id}            delete (204; 409 while referenced)
//!
//! GET    /health                      liveness (no auth)
//! ```
//! Everything under `/api` requires a bearer token; the tenant comes from
//! the token, never from the payload.

pub mod clients;
pub mod orders;
pub mod products;
pub mod reports;

use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{extract::State, Json, Router};
use serde::Serialize;

use tally_db::Database;

use crate::auth::JwtManager;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/orders", post(orders::create).get(orders::list))
        .route("/api/orders/{id}/pay-credit", put(orders::pay_credit))
        .route("/api/orders/{id}/lines", get(orders::lines))
        .route("/api/reports", get(reports::period).post(reports::close_day))
        .route("/api/reports/history", get(reports::history))
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/api/products/{id}/stock", put(products::set_stock))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route("/api/clients/walk-in", get(clients::walk_in))
        .route("/api/clients/{id}", axum::routing::delete(clients::delete))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Liveness probe: answers whether the store can execute a query.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(HealthBody { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody { status: "store_unreachable" }),
        )
    }
}
