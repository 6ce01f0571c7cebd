//! # Report Repository (Report Aggregator)
//!
//! Period aggregation and the day-close snapshot.
//!
//! ## Six Figures
//! ```text
//! cash               Σ total  of cash orders          dated by order_date
//! cash_profit        Σ profit of cash orders          dated by order_date
//! credit             Σ total  of open credit orders   dated by order_date
//! credit_paid        Σ total  of settled orders       dated by payment_date
//! credit_paid_profit Σ profit of settled orders       dated by payment_date
//! total_sales        cash + credit_paid  (derived, money actually collected)
//! ```
//! Settled credit counts toward the day the money arrived, not the day the
//! debt was taken on. Aggregation reads the active window only; orders a
//! previous day-close archived are already captured in that day's snapshot.
//!
//! ## Day Close
//! One transaction: aggregate the day, insert the snapshot, archive the
//! paid orders dated up to the end of that day (cash by `order_date`,
//! settled credit by `payment_date`, matching how each figure is dated).
//! The `UNIQUE (tenant_id, report_date)` index is the idempotence guard; a
//! second close of the same day conflicts instead of double-archiving.
//! Open credit orders are never archived, they are live debt and stay in
//! the active window; paid orders after the window stay live too so their
//! revenue lands in a later snapshot.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::{CoreError, ReportSnapshot, ReportTotals};

use crate::error::{DbError, EngineResult};

/// Raw sums straight out of the aggregation query.
#[derive(Debug, sqlx::FromRow)]
struct PeriodSums {
    cash_cents: i64,
    cash_profit_cents: i64,
    credit_cents: i64,
    credit_paid_cents: i64,
    credit_paid_profit_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for report aggregation and snapshots.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Aggregates the six report figures over a half-open window
    /// `[start, end)`. Read-only; safe to call any number of times.
    pub async fn compute_period(
        &self,
        tenant_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<ReportTotals> {
        let totals = aggregate(&self.pool, tenant_id, start, end).await?;
        debug!(
            total_sales_cents = totals.total_sales_cents,
            "Period report computed"
        );
        Ok(totals)
    }

    /// Aggregates the six figures for one calendar day (UTC).
    pub async fn compute_day(
        &self,
        tenant_id: &str,
        date: NaiveDate,
    ) -> EngineResult<ReportTotals> {
        let (start, end) = day_bounds(date);
        self.compute_period(tenant_id, start, end).await
    }

    /// Closes a business day: aggregates it, persists the snapshot, and
    /// archives the paid orders dated up to the end of that day. One
    /// transaction; a snapshot for the same `(tenant, day)` already
    /// existing is a conflict and nothing moves.
    pub async fn close_day(
        &self,
        tenant_id: &str,
        date: NaiveDate,
    ) -> EngineResult<ReportSnapshot> {
        let (start, end) = day_bounds(date);

        let mut tx: Transaction<'_, Sqlite> = self.pool.begin().await.map_err(DbError::from)?;

        let totals = aggregate(&mut *tx, tenant_id, start, end).await?;

        let snapshot = ReportSnapshot {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            report_date: date,
            total_sales_cents: totals.total_sales_cents,
            cash_cents: totals.cash_cents,
            cash_profit_cents: totals.cash_profit_cents,
            credit_cents: totals.credit_cents,
            credit_paid_cents: totals.credit_paid_cents,
            credit_paid_profit_cents: totals.credit_paid_profit_cents,
            created_at: Utc::now(),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO reports
                (id, tenant_id, report_date, total_sales_cents, cash_cents,
                 cash_profit_cents, credit_cents, credit_paid_cents,
                 credit_paid_profit_cents, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&snapshot.id)
        .bind(&snapshot.tenant_id)
        .bind(snapshot.report_date)
        .bind(snapshot.total_sales_cents)
        .bind(snapshot.cash_cents)
        .bind(snapshot.cash_profit_cents)
        .bind(snapshot.credit_cents)
        .bind(snapshot.credit_paid_cents)
        .bind(snapshot.credit_paid_profit_cents)
        .bind(snapshot.created_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            let db_err = DbError::from(e);
            if db_err.is_unique_violation() {
                return Err(CoreError::ReportAlreadyExists {
                    date: date.to_string(),
                }
                .into());
            }
            return Err(db_err.into());
        }

        // Paid orders dated up to the closed day leave the active window;
        // open credit stays, and so does anything paid after the window --
        // that revenue belongs to a later snapshot.
        let archived = sqlx::query(
            r#"
            UPDATE orders
            SET archived_at = ?
            WHERE tenant_id = ?
              AND archived_at IS NULL
              AND ((payment = 'cash' AND order_date < ?)
                OR (payment = 'credit_settled' AND payment_date < ?))
            "#,
        )
        .bind(Utc::now())
        .bind(tenant_id)
        .bind(end)
        .bind(end)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            report_date = %date,
            total_sales_cents = snapshot.total_sales_cents,
            archived_orders = archived.rows_affected(),
            "Day closed"
        );
        Ok(snapshot)
    }

    /// All snapshots for a tenant, newest day first.
    pub async fn history(&self, tenant_id: &str) -> EngineResult<Vec<ReportSnapshot>> {
        let snapshots = sqlx::query_as::<_, ReportSnapshot>(
            r#"
            SELECT id, tenant_id, report_date, total_sales_cents, cash_cents,
                   cash_profit_cents, credit_cents, credit_paid_cents,
                   credit_paid_profit_cents, created_at
            FROM reports
            WHERE tenant_id = ?
            ORDER BY report_date DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(snapshots)
    }

    /// Fetches one snapshot by day, if the day was closed.
    pub async fn get_by_date(
        &self,
        tenant_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<ReportSnapshot>> {
        let snapshot = sqlx::query_as::<_, ReportSnapshot>(
            r#"
            SELECT id, tenant_id, report_date, total_sales_cents, cash_cents,
                   cash_profit_cents, credit_cents, credit_paid_cents,
                   credit_paid_profit_cents, created_at
            FROM reports
            WHERE tenant_id = ? AND report_date = ?
            "#,
        )
        .bind(tenant_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(snapshot)
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// UTC bounds of one calendar day, half-open.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    (start, start + Duration::days(1))
}

/// One pass over the orders table with a CASE per figure.
///
/// Cash and open credit are dated by `order_date`; settled credit by
/// `payment_date`. Runs on a plain connection or inside a transaction.
async fn aggregate<'c, E>(
    executor: E,
    tenant_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> EngineResult<ReportTotals>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sums = sqlx::query_as::<_, PeriodSums>(
        r#"
        SELECT
            COALESCE(SUM(CASE WHEN payment = 'cash'
                          AND order_date >= ?2 AND order_date < ?3
                         THEN total_cents END), 0)  AS cash_cents,
            COALESCE(SUM(CASE WHEN payment = 'cash'
                          AND order_date >= ?2 AND order_date < ?3
                         THEN profit_cents END), 0) AS cash_profit_cents,
            COALESCE(SUM(CASE WHEN payment = 'credit'
                          AND order_date >= ?2 AND order_date < ?3
                         THEN total_cents END), 0)  AS credit_cents,
            COALESCE(SUM(CASE WHEN payment = 'credit_settled'
                          AND payment_date >= ?2 AND payment_date < ?3
                         THEN total_cents END), 0)  AS credit_paid_cents,
            COALESCE(SUM(CASE WHEN payment = 'credit_settled'
                          AND payment_date >= ?2 AND payment_date < ?3
                         THEN profit_cents END), 0) AS credit_paid_profit_cents
        FROM orders
        WHERE tenant_id = ?1 AND archived_at IS NULL
        "#,
    )
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_one(executor)
    .await
    .map_err(DbError::from)?;

    Ok(ReportTotals::new(
        sums.cash_cents,
        sums.cash_profit_cents,
        sums.credit_cents,
        sums.credit_paid_cents,
        sums.credit_paid_profit_cents,
    ))
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::client::NewClient;
    use crate::repository::order::{NewOrder, NewOrderLine};
    use crate::repository::product::NewProduct;
    use tally_core::{OrderFilter, Tender};

    const TENANT: &str = "tenant-1";

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Creates a one-line order whose total and profit are exactly the
    /// given cents values.
    async fn sale(db: &Database, tender: Tender, total: i64, profit: i64) -> tally_core::Order {
        let product = db
            .products()
            .create(NewProduct {
                tenant_id: TENANT.to_string(),
                name: format!("Product {}", Uuid::new_v4()),
                buy_price_cents: total - profit,
                sell_price_cents: total,
                stock: 1,
                description: None,
            })
            .await
            .unwrap();

        let client = db
            .clients()
            .create(NewClient {
                tenant_id: TENANT.to_string(),
                name: format!("Client {}", Uuid::new_v4()),
                reference: None,
            })
            .await
            .unwrap();

        db.orders()
            .create_order(NewOrder {
                tenant_id: TENANT.to_string(),
                client_id: client.id,
                tender,
                lines: vec![NewOrderLine {
                    product_id: product.id,
                    quantity: 1,
                }],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_six_figure_aggregation() {
        let db = test_db().await;
        let today = Utc::now().date_naive();

        // cash 100/20, open credit 50/10, settled credit 30/5
        sale(&db, Tender::Cash, 100, 20).await;
        sale(&db, Tender::Credit, 50, 10).await;
        let settled = sale(&db, Tender::Credit, 30, 5).await;
        db.orders().settle_credit(TENANT, &settled.id).await.unwrap();

        let totals = db.reports().compute_day(TENANT, today).await.unwrap();

        assert_eq!(totals.cash_cents, 100);
        assert_eq!(totals.cash_profit_cents, 20);
        assert_eq!(totals.credit_cents, 50);
        assert_eq!(totals.credit_paid_cents, 30);
        assert_eq!(totals.credit_paid_profit_cents, 5);
        // collected = cash + settled credit
        assert_eq!(totals.total_sales_cents, 130);
    }

    #[tokio::test]
    async fn test_empty_day_is_all_zero() {
        let db = test_db().await;
        let totals = db
            .reports()
            .compute_day(TENANT, Utc::now().date_naive())
            .await
            .unwrap();
        assert_eq!(totals, ReportTotals::zero());
    }

    #[tokio::test]
    async fn test_aggregation_is_tenant_scoped() {
        let db = test_db().await;
        sale(&db, Tender::Cash, 100, 20).await;

        let totals = db
            .reports()
            .compute_day("other-tenant", Utc::now().date_naive())
            .await
            .unwrap();
        assert_eq!(totals, ReportTotals::zero());
    }

    #[tokio::test]
    async fn test_close_day_snapshots_and_archives() {
        let db = test_db().await;
        let today = Utc::now().date_naive();

        sale(&db, Tender::Cash, 100, 20).await;
        let open_credit = sale(&db, Tender::Credit, 50, 10).await;
        let settled = sale(&db, Tender::Credit, 30, 5).await;
        db.orders().settle_credit(TENANT, &settled.id).await.unwrap();

        let snapshot = db.reports().close_day(TENANT, today).await.unwrap();
        assert_eq!(snapshot.total_sales_cents, 130);
        assert_eq!(snapshot.report_date, today);

        // Paid orders left the active window; open credit did not.
        let active = db
            .orders()
            .list(TENANT, OrderFilter::All, None)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, open_credit.id);

        // Archived rows still exist for audit.
        let archived = db.orders().get_by_id(TENANT, &settled.id).await.unwrap();
        assert!(archived.archived_at.is_some());
    }

    #[tokio::test]
    async fn test_close_day_is_idempotent_by_conflict() {
        let db = test_db().await;
        let today = Utc::now().date_naive();

        sale(&db, Tender::Cash, 100, 20).await;
        db.reports().close_day(TENANT, today).await.unwrap();

        // A later sale must not sneak into a re-closed day.
        sale(&db, Tender::Cash, 999, 1).await;

        let err = db.reports().close_day(TENANT, today).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::ReportAlreadyExists { .. })
        ));

        // Exactly one snapshot, with the original figures.
        let history = db.reports().history(TENANT).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].total_sales_cents, 100);

        // The failed second close archived nothing.
        let active = db
            .orders()
            .list(TENANT, OrderFilter::All, None)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn test_close_day_keeps_client_balances() {
        let db = test_db().await;
        let open_credit = sale(&db, Tender::Credit, 50, 10).await;

        db.reports()
            .close_day(TENANT, Utc::now().date_naive())
            .await
            .unwrap();

        // Archival never touches the ledger; the debt survives the close
        // and can still be settled.
        let client = db
            .clients()
            .get_by_id(TENANT, &open_credit.client_id)
            .await
            .unwrap();
        assert_eq!(client.balance_cents, 50);

        db.orders()
            .settle_credit(TENANT, &open_credit.id)
            .await
            .unwrap();
        let client = db
            .clients()
            .get_by_id(TENANT, &open_credit.client_id)
            .await
            .unwrap();
        assert_eq!(client.balance_cents, 0);
    }

    #[tokio::test]
    async fn test_closing_a_past_day_leaves_later_orders_live() {
        let db = test_db().await;
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);

        // Paid activity happens today, then yesterday gets closed late.
        let cash = sale(&db, Tender::Cash, 100, 20).await;
        let settled = sale(&db, Tender::Credit, 30, 5).await;
        db.orders().settle_credit(TENANT, &settled.id).await.unwrap();

        let snapshot = db.reports().close_day(TENANT, yesterday).await.unwrap();
        assert_eq!(snapshot.total_sales_cents, 0);

        // Today's revenue is untouched and still reportable.
        let cash_reread = db.orders().get_by_id(TENANT, &cash.id).await.unwrap();
        assert!(cash_reread.archived_at.is_none());

        let totals = db.reports().compute_day(TENANT, today).await.unwrap();
        assert_eq!(totals.cash_cents, 100);
        assert_eq!(totals.credit_paid_cents, 30);
        assert_eq!(totals.total_sales_cents, 130);

        // Closing today then captures and archives it.
        let snapshot = db.reports().close_day(TENANT, today).await.unwrap();
        assert_eq!(snapshot.total_sales_cents, 130);
        let active = db
            .orders()
            .list(TENANT, OrderFilter::All, None)
            .await
            .unwrap();
        assert!(active.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_date_and_history_order() {
        let db = test_db().await;
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);

        sale(&db, Tender::Cash, 100, 20).await;
        db.reports().close_day(TENANT, yesterday).await.unwrap();
        db.reports().close_day(TENANT, today).await.unwrap();

        let history = db.reports().history(TENANT).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].report_date, today);

        assert!(db
            .reports()
            .get_by_date(TENANT, yesterday)
            .await
            .unwrap()
            .is_some());
        assert!(db
            .reports()
            .get_by_date(TENANT, today - Duration::days(30))
            .await
            .unwrap()
            .is_none());
    }
}
