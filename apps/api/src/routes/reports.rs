//! Report endpoints: period figures, day close, snapshot history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tally_core::{ReportSnapshot, ReportTotals};

use crate::auth::AuthTenant;
use crate::error::ApiError;
use crate::routes::AppState;

// =============================================================================
// Wire Types
// =============================================================================

/// The six report figures. All integer cents.
#[derive(Debug, Serialize)]
pub struct ReportDto {
    pub total_sales: i64,
    pub cash: i64,
    pub cash_profit: i64,
    pub credit: i64,
    pub credit_paid: i64,
    pub credit_paid_profit: i64,
}

impl From<ReportTotals> for ReportDto {
    fn from(t: ReportTotals) -> Self {
        ReportDto {
            total_sales: t.total_sales_cents,
            cash: t.cash_cents,
            cash_profit: t.cash_profit_cents,
            credit: t.credit_cents,
            credit_paid: t.credit_paid_cents,
            credit_paid_profit: t.credit_paid_profit_cents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotDto {
    pub id: String,
    pub report_date: NaiveDate,
    pub total_sales: i64,
    pub cash: i64,
    pub cash_profit: i64,
    pub credit: i64,
    pub credit_paid: i64,
    pub credit_paid_profit: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ReportSnapshot> for SnapshotDto {
    fn from(s: ReportSnapshot) -> Self {
        SnapshotDto {
            id: s.id,
            report_date: s.report_date,
            total_sales: s.total_sales_cents,
            cash: s.cash_cents,
            cash_profit: s.cash_profit_cents,
            credit: s.credit_cents,
            credit_paid: s.credit_paid_cents,
            credit_paid_profit: s.credit_paid_profit_cents,
            created_at: s.created_at,
        }
    }
}

/// Inclusive date range; both ends default to today (UTC).
#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CloseDayRequest {
    /// Day to close; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn period(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Query(params): Query<PeriodParams>,
) -> Result<Json<ReportDto>, ApiError> {
    let today = Utc::now().date_naive();
    let start = params.start.unwrap_or(today);
    let end = params.end.unwrap_or(today);

    if end < start {
        return Err(ApiError::validation("end must not be before start"));
    }

    // Inclusive dates → half-open datetime window
    let start_at = day_start(start);
    let end_at = day_start(end) + Duration::days(1);

    let totals = state
        .db
        .reports()
        .compute_period(&tenant_id, start_at, end_at)
        .await?;

    Ok(Json(totals.into()))
}

pub async fn close_day(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
    Json(req): Json<CloseDayRequest>,
) -> Result<(StatusCode, Json<SnapshotDto>), ApiError> {
    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let snapshot = state.db.reports().close_day(&tenant_id, date).await?;
    Ok((StatusCode::CREATED, Json(snapshot.into())))
}

pub async fn history(
    State(state): State<AppState>,
    AuthTenant(tenant_id): AuthTenant,
) -> Result<Json<Vec<SnapshotDto>>, ApiError> {
    let snapshots = state.db.reports().history(&tenant_id).await?;
    Ok(Json(snapshots.into_iter().map(SnapshotDto::from).collect()))
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}
