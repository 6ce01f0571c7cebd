//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌───────────────┐   ┌───────────────┐   ┌────────────────┐
//! │    Product    │   │    Client     │   │     Order      │
//! │ ───────────── │   │ ───────────── │   │ ────────────── │
//! │ id (UUID)     │   │ id (UUID)     │   │ id (UUID)      │
//! │ buy/sell price│   │ balance_cents │   │ total, profit  │
//! │ stock         │   │ is_walk_in    │   │ payment state  │
//! └───────────────┘   └───────────────┘   └───────┬────────┘
//!                                                 │ 1..n
//!                                         ┌───────▼────────┐
//!                                         │   OrderLine    │
//!                                         │ product, qty   │
//!                                         └────────────────┘
//! ```
//!
//! ## Payment State Machine
//! ```text
//! create ──► Cash            (terminal: paid immediately)
//! create ──► Credit ──► CreditSettled   (settle-credit, terminal)
//! ```
//! No transition ever removes an order; day-close archives settled orders
//! but open credit stays in the active window because it is real debt.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::money::Money;

// =============================================================================
// Payment State
// =============================================================================

/// Tri-state payment status of an order.
///
/// Historical variants of this system encoded payment as a boolean; the
/// tri-state enum is the superset. Legacy data maps with
/// [`PaymentState::from_legacy_flag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Paid in full at the till.
    Cash,
    /// Deferred payment, outstanding client debt.
    Credit,
    /// Deferred payment that was later settled.
    CreditSettled,
}

impl PaymentState {
    /// Maps the legacy boolean payment flag: `true` meant paid (cash),
    /// `false` meant unpaid (credit).
    pub const fn from_legacy_flag(paid: bool) -> Self {
        if paid {
            PaymentState::Cash
        } else {
            PaymentState::Credit
        }
    }

    /// Whether this order still represents outstanding debt.
    pub const fn is_open_credit(&self) -> bool {
        matches!(self, PaymentState::Credit)
    }

    /// Whether the order has been paid (immediately or eventually).
    pub const fn is_paid(&self) -> bool {
        matches!(self, PaymentState::Cash | PaymentState::CreditSettled)
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentState::Cash => "cash",
            PaymentState::Credit => "credit",
            PaymentState::CreditSettled => "credit_settled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Tender
// =============================================================================

/// Payment method chosen at checkout.
///
/// Only `Cash` and `Credit` are reachable at creation; `CreditSettled`
/// exists solely as the result of a later settle-credit transition, so it
/// is deliberately absent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tender {
    Cash,
    Credit,
}

impl Tender {
    /// The payment state a fresh order starts in.
    pub const fn initial_state(&self) -> PaymentState {
        match self {
            Tender::Cash => PaymentState::Cash,
            Tender::Credit => PaymentState::Credit,
        }
    }
}

// =============================================================================
// Order Filter
// =============================================================================

/// Tri-state listing filter for orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    /// All orders in the active window.
    #[default]
    All,
    /// Paid orders: cash plus settled credit.
    Paid,
    /// Open (unsettled) credit orders.
    Credit,
}

impl FromStr for OrderFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(OrderFilter::All),
            "paid" => Ok(OrderFilter::Paid),
            "credit" => Ok(OrderFilter::Credit),
            other => Err(format!("unknown order filter: {other}")),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Display name.
    pub name: String,

    /// Acquisition price in cents (for profit calculation).
    pub buy_price_cents: i64,

    /// Selling price in cents.
    pub sell_price_cents: i64,

    /// Current stock level. Never negative after settlement.
    pub stock: i64,

    /// Optional free-form description.
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Selling price as Money.
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }

    /// Acquisition price as Money.
    #[inline]
    pub fn buy_price(&self) -> Money {
        Money::from_cents(self.buy_price_cents)
    }

    /// Margin per unit sold.
    #[inline]
    pub fn unit_margin(&self) -> Money {
        self.sell_price() - self.buy_price()
    }
}

// =============================================================================
// Client
// =============================================================================

/// A client with a running credit balance.
///
/// Positive balance means the client owes money. The walk-in client is the
/// distinguished anonymous client: its balance is always zero and it can
/// never carry credit orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: String,
    pub tenant_id: String,
    pub name: String,

    /// External reference number (phone, account number, ...).
    pub reference: Option<String>,

    /// Running balance in cents; positive = client owes money.
    pub balance_cents: i64,

    /// Marks the single per-tenant walk-in client.
    pub is_walk_in: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Balance as Money.
    #[inline]
    pub fn balance(&self) -> Money {
        Money::from_cents(self.balance_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order.
///
/// Invariants:
/// - `total_cents = Σ(line.quantity × sell price at time of sale)`
/// - `profit_cents = Σ(line.quantity × (sell − buy) at time of sale)`
/// - later price edits never retroactively change recorded figures
/// - `payment_date` is set exactly when the state becomes `CreditSettled`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub client_id: String,

    /// Total sale price in cents, computed server-side at creation.
    pub total_cents: i64,

    /// Profit in cents, frozen at creation from then-current buy prices.
    pub profit_cents: i64,

    pub payment: PaymentState,

    /// When the order was created.
    pub order_date: DateTime<Utc>,

    /// When credit was settled; None until `CreditSettled`.
    pub payment_date: Option<DateTime<Utc>>,

    /// Set by day-close when the order leaves the active window.
    pub archived_at: Option<DateTime<Utc>>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item, child of exactly one order (cascade-deleted with it).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// An order line joined with catalog data, for the order-details view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLineDetail {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub product_name: String,
    pub sell_price_cents: i64,
}

// =============================================================================
// Report Types
// =============================================================================

/// Aggregated figures for a reporting window. Six numbers, all cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Cash plus settled credit: everything actually collected in window.
    pub total_sales_cents: i64,
    /// Σ total of cash orders.
    pub cash_cents: i64,
    /// Σ profit of cash orders.
    pub cash_profit_cents: i64,
    /// Σ total of outstanding credit orders (dated by order time).
    pub credit_cents: i64,
    /// Σ total of settled credit orders (dated by settlement time).
    pub credit_paid_cents: i64,
    /// Σ profit of settled credit orders.
    pub credit_paid_profit_cents: i64,
}

impl ReportTotals {
    /// Builds totals from the five independent sums; `total_sales` is
    /// derived, not supplied, so it cannot drift out of agreement.
    pub fn new(
        cash_cents: i64,
        cash_profit_cents: i64,
        credit_cents: i64,
        credit_paid_cents: i64,
        credit_paid_profit_cents: i64,
    ) -> Self {
        ReportTotals {
            total_sales_cents: cash_cents + credit_paid_cents,
            cash_cents,
            cash_profit_cents,
            credit_cents,
            credit_paid_cents,
            credit_paid_profit_cents,
        }
    }

    /// An all-zero report (empty window).
    pub fn zero() -> Self {
        ReportTotals::new(0, 0, 0, 0, 0)
    }
}

/// A persisted day-close snapshot. Append-only, at most one per
/// `(tenant, report_date)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReportSnapshot {
    pub id: String,
    pub tenant_id: String,
    pub report_date: NaiveDate,
    pub total_sales_cents: i64,
    pub cash_cents: i64,
    pub cash_profit_cents: i64,
    pub credit_cents: i64,
    pub credit_paid_cents: i64,
    pub credit_paid_profit_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl ReportSnapshot {
    /// The aggregates carried by this snapshot.
    pub fn totals(&self) -> ReportTotals {
        ReportTotals {
            total_sales_cents: self.total_sales_cents,
            cash_cents: self.cash_cents,
            cash_profit_cents: self.cash_profit_cents,
            credit_cents: self.credit_cents,
            credit_paid_cents: self.credit_paid_cents,
            credit_paid_profit_cents: self.credit_paid_profit_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
