//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::Product;
use tally_db::{NewProduct, ProductUpdate};

use crate::auth::AuthTenant;
use crate::error::ApiError;
use crate::routes::AppState;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub buy_price: i64,
    pub sell_price: i64,
    pub stock: i64,
    pub description: Option<String>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            name: p.name,
            buy_price: p.buy_price_cents,
            sell_price: p.sell_price_cents,
            stock: p.stock,
            description: p.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub buy_price: i64,
    pub sell_price: i64,
    pub stock: i64,
    pub description: Option<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub buy_price: Option<i64>,
    pub sell_price: Option<i64>,
    pub stock: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Substring match on the product name.
    pub name: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state
        .db
        .products()
        .list(&tenant_id, params.name.as_deref())
        .await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    let product = state
        .db
        .products()
        .create(NewProduct {
            tenant_id,
            name: req.name,
            buy_price_cents: req.buy_price,
            sell_price_cents: req.sell_price,
            stock: req.stock,
            description: req.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn update(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = state
        .db
        .products()
        .update(
            &tenant_id,
            &id,
            ProductUpdate {
                name: req.name,
                buy_price_cents: req.buy_price,
                sell_price_cents: req.sell_price,
                stock: req.stock,
                description: req.description.map(Some),
            },
        )
        .await?;

    Ok(Json(product.into()))
}

pub async fn set_stock(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    let product = state
        .db
        .products()
        .update(
            &tenant_id,
            &id,
            ProductUpdate {
                stock: Some(req.stock),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(product.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(&tenant_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
