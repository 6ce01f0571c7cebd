//! Order endpoints: checkout, credit settlement, listing, line details.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use tally_core::{Order, OrderFilter, OrderLineDetail, PaymentState, Tender};
use tally_db::{NewOrder, NewOrderLine};

use crate::auth::AuthTenant;
use crate::error::ApiError;
use crate::routes::AppState;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    /// "cash" or "credit"
    pub payment: Tender,
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// An order as the caller sees it. All money fields are integer cents.
#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: String,
    pub client_id: String,
    pub total_price: i64,
    pub profit: i64,
    pub payment: PaymentState,
    pub order_date: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        OrderDto {
            id: order.id,
            client_id: order.client_id,
            total_price: order.total_cents,
            profit: order.profit_cents,
            payment: order.payment,
            order_date: order.order_date,
            payment_date: order.payment_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LineDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub sell_price: i64,
}

impl From<OrderLineDetail> for LineDto {
    fn from(line: OrderLineDetail) -> Self {
        LineDto {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            sell_price: line.sell_price_cents,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// "all" (default), "paid", or "credit"
    pub state: Option<String>,
    pub client_id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn create(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDto>), ApiError> {
    let order = state
        .db
        .orders()
        .create_order(NewOrder {
            tenant_id,
            client_id: req.client_id,
            tender: req.payment,
            lines: req
                .lines
                .into_iter()
                .map(|l| NewOrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn pay_credit(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
) -> Result<Json<OrderDto>, ApiError> {
    let order = state.db.orders().settle_credit(&tenant_id, &id).await?;
    Ok(Json(order.into()))
}

pub async fn list(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrderDto>>, ApiError> {
    let filter = match params.state.as_deref() {
        None => OrderFilter::All,
        Some(s) => OrderFilter::from_str(s).map_err(ApiError::validation)?,
    };

    let orders = state
        .db
        .orders()
        .list(&tenant_id, filter, params.client_id.as_deref())
        .await?;

    Ok(Json(orders.into_iter().map(OrderDto::from).collect()))
}

pub async fn lines(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
) -> Result<Json<Vec<LineDto>>, ApiError> {
    let lines = state
        .db
        .orders()
        .lines_with_products(&tenant_id, &id)
        .await?;
    Ok(Json(lines.into_iter().map(LineDto::from).collect()))
}
