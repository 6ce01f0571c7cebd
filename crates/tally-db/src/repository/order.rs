//! # Order Repository (Order Engine)
//!
//! The transactional core of Tally POS: order creation, credit settlement
//! and order listing.
//!
//! ## Create-Order Transaction
//! ```text
//! validate input (no rows touched yet)
//!      │
//! BEGIN
//!      │ load client (tenant-scoped) ──────── missing → ClientNotFound
//!      │ walk-in + credit tender? ─────────── CreditRequiresNamedClient
//!      │ per line:
//!      │   load product (tenant-scoped) ───── missing → ProductNotFound
//!      │   UPDATE products SET stock = stock - qty
//!      │        WHERE id = ? AND stock >= qty
//!      │   0 rows affected ────────────────── InsufficientStock
//!      │ price lines from the rows just read (never from the request)
//!      │ INSERT order + lines
//!      │ credit tender: balance += total
//! COMMIT
//! ```
//! Any error path drops the transaction, which rolls it back: a failed
//! order leaves no stock or balance change behind.
//!
//! ## Settle-Credit Transaction
//! Exactly one legal transition: `credit → credit_settled`. Settling a cash
//! or already-settled order is a hard conflict, because a second settlement
//! would decrement the client balance twice.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_core::{
    price_order, validation, Client, CoreError, OrderFilter, OrderLineDetail, PaymentState,
    PricedLine, Product, Tender,
};
use tally_core::{Order, OrderLine};

use crate::error::{DbError, EngineResult};

// =============================================================================
// Input Types
// =============================================================================

/// One requested line: a product reference and a quantity.
///
/// Deliberately carries no prices. The authoritative prices are read inside
/// the transaction.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A checkout request.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub tenant_id: String,
    pub client_id: String,
    pub tender: Tender,
    pub lines: Vec<NewOrderLine>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an order atomically: stock decrements, the order row, its
    /// lines, and (for credit) the client balance increment all commit
    /// together or not at all.
    pub async fn create_order(&self, new: NewOrder) -> EngineResult<Order> {
        validation::validate_line_count(new.lines.len())?;
        for line in &new.lines {
            validation::validate_quantity(line.quantity)?;
        }

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        // Client must exist in this tenant before anything is decremented.
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, tenant_id, name, reference, balance_cents, is_walk_in,
                   created_at, updated_at
            FROM clients
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(&new.client_id)
        .bind(&new.tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::ClientNotFound(new.client_id.clone()))?;

        if new.tender == Tender::Credit && client.is_walk_in {
            return Err(CoreError::CreditRequiresNamedClient.into());
        }

        // Decrement stock per line; collect the authoritative prices as we go.
        let mut priced = Vec::with_capacity(new.lines.len());
        for line in &new.lines {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, tenant_id, name, buy_price_cents, sell_price_cents,
                       stock, description, created_at, updated_at
                FROM products
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(&line.product_id)
            .bind(&new.tenant_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            // Conditional decrement: the WHERE clause re-checks stock so two
            // concurrent orders cannot both take the last units.
            let result = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?, updated_at = ?
                WHERE id = ? AND tenant_id = ? AND stock >= ?
                "#,
            )
            .bind(line.quantity)
            .bind(Utc::now())
            .bind(&line.product_id)
            .bind(&new.tenant_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                warn!(
                    product_id = %line.product_id,
                    available = product.stock,
                    requested = line.quantity,
                    "Order rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            priced.push(PricedLine {
                sell_price: product.sell_price(),
                buy_price: product.buy_price(),
                quantity: line.quantity,
            });
        }

        let totals = price_order(&priced);

        let order = Order {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id.clone(),
            client_id: client.id.clone(),
            total_cents: totals.total.cents(),
            profit_cents: totals.profit.cents(),
            payment: new.tender.initial_state(),
            order_date: Utc::now(),
            payment_date: None,
            archived_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, tenant_id, client_id, total_cents, profit_cents, payment,
                 order_date, payment_date, archived_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, NULL, NULL)
            "#,
        )
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(&order.client_id)
        .bind(order.total_cents)
        .bind(order.profit_cents)
        .bind(order.payment)
        .bind(order.order_date)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        for line in &new.lines {
            sqlx::query(
                "INSERT INTO order_lines (id, order_id, product_id, quantity) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        // Deferred payment: the sale becomes debt on the client ledger.
        if new.tender == Tender::Credit {
            sqlx::query(
                r#"
                UPDATE clients
                SET balance_cents = balance_cents + ?, updated_at = ?
                WHERE id = ? AND tenant_id = ?
                "#,
            )
            .bind(order.total_cents)
            .bind(Utc::now())
            .bind(&client.id)
            .bind(&new.tenant_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            order_id = %order.id,
            client_id = %order.client_id,
            total_cents = order.total_cents,
            payment = %order.payment,
            "Order created"
        );
        Ok(order)
    }

    /// Settles an open credit order: `credit → credit_settled`, stamps the
    /// payment date, and decrements the client balance by the order total.
    /// All in one transaction.
    pub async fn settle_credit(&self, tenant_id: &str, order_id: &str) -> EngineResult<Order> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let mut order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, tenant_id, client_id, total_cents, profit_cents,
                   payment, order_date, payment_date, archived_at
            FROM orders
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(order_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if order.payment != PaymentState::Credit {
            return Err(CoreError::NotCreditOrder {
                order_id: order_id.to_string(),
                state: order.payment.to_string(),
            }
            .into());
        }

        let settled_at = Utc::now();

        // The UPDATE re-checks the state, so a concurrent settle that got
        // past the read above surfaces as a conflict, not a double
        // balance decrement.
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET payment = ?, payment_date = ?
            WHERE id = ? AND tenant_id = ? AND payment = 'credit'
            "#,
        )
        .bind(PaymentState::CreditSettled)
        .bind(settled_at)
        .bind(order_id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotCreditOrder {
                order_id: order_id.to_string(),
                state: PaymentState::CreditSettled.to_string(),
            }
            .into());
        }

        sqlx::query(
            r#"
            UPDATE clients
            SET balance_cents = balance_cents - ?, updated_at = ?
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(order.total_cents)
        .bind(settled_at)
        .bind(&order.client_id)
        .bind(tenant_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        order.payment = PaymentState::CreditSettled;
        order.payment_date = Some(settled_at);

        info!(
            order_id = %order.id,
            total_cents = order.total_cents,
            "Credit order settled"
        );
        Ok(order)
    }

    /// Lists orders in the active window (not archived), newest first.
    ///
    /// ## Filter Semantics
    /// - `All`    — every active order
    /// - `Paid`   — cash and settled credit
    /// - `Credit` — open credit only
    ///
    /// An optional client id narrows the result to one client's orders.
    pub async fn list(
        &self,
        tenant_id: &str,
        filter: OrderFilter,
        client_id: Option<&str>,
    ) -> EngineResult<Vec<Order>> {
        let mut sql = String::from(
            r#"
            SELECT id, tenant_id, client_id, total_cents, profit_cents,
                   payment, order_date, payment_date, archived_at
            FROM orders
            WHERE tenant_id = ? AND archived_at IS NULL
            "#,
        );

        match filter {
            OrderFilter::All => {}
            OrderFilter::Paid => sql.push_str(" AND payment IN ('cash', 'credit_settled')"),
            OrderFilter::Credit => sql.push_str(" AND payment = 'credit'"),
        }
        if client_id.is_some() {
            sql.push_str(" AND client_id = ?");
        }
        sql.push_str(" ORDER BY order_date DESC");

        let mut query = sqlx::query_as::<_, Order>(&sql).bind(tenant_id);
        if let Some(cid) = client_id {
            query = query.bind(cid);
        }

        let orders = query.fetch_all(&self.pool).await.map_err(DbError::from)?;

        debug!(count = orders.len(), ?filter, "Orders listed");
        Ok(orders)
    }

    /// Fetches a single order by id, scoped to the tenant.
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> EngineResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, tenant_id, client_id, total_cents, profit_cents,
                   payment, order_date, payment_date, archived_at
            FROM orders
            WHERE id = ? AND tenant_id = ?
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

        Ok(order)
    }

    /// Returns an order's lines joined with catalog names and prices, for
    /// the order-details view.
    pub async fn lines_with_products(
        &self,
        tenant_id: &str,
        order_id: &str,
    ) -> EngineResult<Vec<OrderLineDetail>> {
        // Resolve the order first so a foreign order id reads as not-found
        // rather than an empty line list.
        let order = self.get_by_id(tenant_id, order_id).await?;

        let lines = sqlx::query_as::<_, OrderLineDetail>(
            r#"
            SELECT ol.id, ol.order_id, ol.product_id, ol.quantity,
                   p.name AS product_name, p.sell_price_cents
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            WHERE ol.order_id = ?
            "#,
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(lines)
    }

    /// Raw lines of an order (no catalog join). Mostly for tests and audit.
    pub async fn lines(&self, order_id: &str) -> EngineResult<Vec<OrderLine>> {
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, product_id, quantity FROM order_lines WHERE order_id = ?",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(lines)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
