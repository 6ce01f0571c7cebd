//! # Product Repository
//!
//! Catalog access: create, list, update, delete products.
//!
//! ## Stock Discipline
//! Catalog edits may set stock directly (deliveries, corrections) but the
//! value is validated non-negative before it reaches SQL. Settlement-time
//! decrements do NOT go through this repository; they happen inside the
//! order transaction with a conditional UPDATE (see `order.rs`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::{validation, CoreError, Product};

use crate::error::{DbError, EngineResult};

// =============================================================================
// Input Types
// =============================================================================

/// Data required to create a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub tenant_id: String,
    pub name: String,
    pub buy_price_cents: i64,
    pub sell_price_cents: i64,
    pub stock: i64,
    pub description: Option<String>,
}

/// Partial update for a product. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub buy_price_cents: Option<i64>,
    pub sell_price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub description: Option<Option<String>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product.
    pub async fn create(&self, new: NewProduct) -> EngineResult<Product> {
        validation::validate_name(&new.name)?;
        validation::validate_price_cents(new.buy_price_cents)?;
        validation::validate_price_cents(new.sell_price_cents)?;
        validation::validate_stock(new.stock)?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id,
            name: new.name.trim().to_string(),
            buy_price_cents: new.buy_price_cents,
            sell_price_cents: new.sell_price_cents,
            stock: new.stock,
            description: new.description,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO products
                (id, tenant_id, name, buy_price_cents, sell_price_cents,
                 stock, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.name)
        .bind(product.buy_price_cents)
        .bind(product.sell_price_cents)
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Lists products for a tenant, optionally filtered by a name substring.
    pub async fn list(
        &self,
        tenant_id: &str,
        name_filter: Option<&str>,
    ) -> EngineResult<Vec<Product>> {
        let products = match name_filter {
            Some(fragment) => {
                let pattern = format!("%{}%", fragment);
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, tenant_id, name, buy_price_cents, sell_price_cents,
                           stock, description, created_at, updated_at
                    FROM products
                    WHERE tenant_id = ? AND name LIKE ?
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id)
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, tenant_id, name, buy_price_cents, sell_price_cents,
                           stock, description, created_at, updated_at
                    FROM products
                    WHERE tenant_id = ?
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(DbError::from)?;

        debug!(count = products.len(), "Products listed");
        Ok(products)
    }

    /// Fetches a single product by id, scoped to the tenant.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> EngineResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, tenant_id, name, buy_price_cents, sell_price_cents,
                   stock, description, created_at, updated_at
            FROM products
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        Ok(product)
    }

    /// Applies a partial update to a product.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: &str,
        update: ProductUpdate,
    ) -> EngineResult<Product> {
        let mut product = self.get_by_id(tenant_id, id).await?;

        if let Some(name) = update.name {
            validation::validate_name(&name)?;
            product.name = name.trim().to_string();
        }
        if let Some(buy) = update.buy_price_cents {
            validation::validate_price_cents(buy)?;
            product.buy_price_cents = buy;
        }
        if let Some(sell) = update.sell_price_cents {
            validation::validate_price_cents(sell)?;
            product.sell_price_cents = sell;
        }
        if let Some(stock) = update.stock {
            validation::validate_stock(stock)?;
            product.stock = stock;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products
            SET name = ?, buy_price_cents = ?, sell_price_cents = ?,
                stock = ?, description = ?, updated_at = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&product.name)
        .bind(product.buy_price_cents)
        .bind(product.sell_price_cents)
        .bind(product.stock)
        .bind(&product.description)
        .bind(product.updated_at)
        .bind(&product.id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Deletes a product.
    ///
    /// Fails with a foreign-key conflict if any order line still references
    /// the product (RESTRICT); historical orders keep their lines intact.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> EngineResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id.to_string()).into());
        }

        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
