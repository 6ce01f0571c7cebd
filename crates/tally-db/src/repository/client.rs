//! # Client Repository
//!
//! Client ledger access: create, list, delete clients and bootstrap the
//! per-tenant walk-in client.
//!
//! ## Balance Invariant
//! `balance_cents` is never written by this repository. Only the order
//! engine mutates balances, inside the same transaction that creates or
//! settles the order, so the ledger always equals the sum of open credit
//! order totals.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::{validation, Client, CoreError, WALK_IN_CLIENT_NAME};

use crate::error::{DbError, EngineResult};

// =============================================================================
// Input Types
// =============================================================================

/// Data required to create a new client.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub tenant_id: String,
    pub name: String,
    pub reference: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for client ledger operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Creates a new named client with a zero balance.
    pub async fn create(&self, new: NewClient) -> EngineResult<Client> {
        validation::validate_name(&new.name)?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id,
            name: new.name.trim().to_string(),
            reference: new.reference,
            balance_cents: 0,
            is_walk_in: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO clients
                (id, tenant_id, name, reference, balance_cents, is_walk_in,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&client.id)
        .bind(&client.tenant_id)
        .bind(&client.name)
        .bind(&client.reference)
        .bind(client.balance_cents)
        .bind(client.is_walk_in)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        info!(client_id = %client.id, name = %client.name, "Client created");
        Ok(client)
    }

    /// Lists all clients for a tenant, walk-in first, then by name.
    pub async fn list(&self, tenant_id: &str) -> EngineResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, tenant_id, name, reference, balance_cents, is_walk_in,
                   created_at, updated_at
            FROM clients
            WHERE tenant_id = ?
            ORDER BY is_walk_in DESC, name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(count = clients.len(), "Clients listed");
        Ok(clients)
    }

    /// Fetches a single client by id, scoped to the tenant.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> EngineResult<Client> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, tenant_id, name, reference, balance_cents, is_walk_in,
                   created_at, updated_at
            FROM clients
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::ClientNotFound(id.to_string()))?;

        Ok(client)
    }

    /// Returns the tenant's walk-in client, creating it on first use.
    ///
    /// Concurrent bootstraps are safe: the partial unique index on
    /// `(tenant_id) WHERE is_walk_in = 1` makes the insert a no-op for the
    /// loser, and both callers read back the same row.
    pub async fn ensure_walk_in(&self, tenant_id: &str) -> EngineResult<Client> {
        if let Some(existing) = self.find_walk_in(tenant_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO clients
                (id, tenant_id, name, reference, balance_cents, is_walk_in,
                 created_at, updated_at)
            VALUES (?, ?, ?, NULL, 0, 1, ?, ?)
            ON CONFLICT (tenant_id) WHERE is_walk_in = 1 DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(tenant_id)
        .bind(WALK_IN_CLIENT_NAME)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        let client = self
            .find_walk_in(tenant_id)
            .await?
            .ok_or_else(|| DbError::Internal("walk-in client missing after insert".to_string()))?;

        info!(client_id = %client.id, "Walk-in client ready");
        Ok(client)
    }

    async fn find_walk_in(&self, tenant_id: &str) -> EngineResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, tenant_id, name, reference, balance_cents, is_walk_in,
                   created_at, updated_at
            FROM clients
            WHERE tenant_id = ? AND is_walk_in = 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(client)
    }

    /// Deletes a client.
    ///
    /// Fails with a foreign-key conflict while any order (active or
    /// archived) still references the client.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> EngineResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ClientNotFound(id.to_string()).into());
        }

        info!(client_id = %id, "Client deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
