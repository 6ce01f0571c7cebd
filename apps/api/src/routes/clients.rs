//! Client ledger endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use tally_core::Client;
use tally_db::NewClient;

use crate::auth::AuthTenant;
use crate::error::ApiError;
use crate::routes::AppState;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ClientDto {
    pub id: String,
    pub name: String,
    pub reference: Option<String>,
    /// Running balance in cents; positive = client owes money.
    pub balance: i64,
    pub is_walk_in: bool,
}

impl From<Client> for ClientDto {
    fn from(c: Client) -> Self {
        ClientDto {
            id: c.id,
            name: c.name,
            reference: c.reference,
            balance: c.balance_cents,
            is_walk_in: c.is_walk_in,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    pub reference: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn list(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
) -> Result<Json<Vec<ClientDto>>, ApiError> {
    let clients = state.db.clients().list(&tenant_id).await?;
    Ok(Json(clients.into_iter().map(ClientDto::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Json(req): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientDto>), ApiError> {
    let client = state
        .db
        .clients()
        .create(NewClient {
            tenant_id,
            name: req.name,
            reference: req.reference,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(client.into())))
}

/// Returns the tenant's walk-in client, creating it on first use.
pub async fn walk_in(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
) -> Result<Json<ClientDto>, ApiError> {
    let client = state.db.clients().ensure_walk_in(&tenant_id).await?;
    Ok(Json(client.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db.clients().delete(&tenant_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
