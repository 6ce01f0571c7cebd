//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the heart of Tally POS. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Settlement API (axum)                        │
//! │   POST /orders  PUT /orders/{id}/pay-credit  POST /reports      │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │               ★ tally-core (THIS CRATE) ★                       │
//! │                                                                 │
//! │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │
//! │   │   types   │  │   money   │  │  pricing  │  │ validation│   │
//! │   │  Product  │  │   Money   │  │  totals   │  │   rules   │   │
//! │   │   Order   │  │  (cents)  │  │  profit   │  │   checks  │   │
//! │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │
//! │                                                                 │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │                    tally-db (Database Layer)                    │
//! │          SQLite, migrations, order engine, aggregator           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, Order, PaymentState, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Server-side order total/profit computation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Server-side prices**: totals and profit are always recomputed from
//!    authoritative prices, never accepted from a client

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_order, OrderTotals, PricedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of distinct lines allowed in a single order.
///
/// Prevents runaway carts and keeps transactions a reasonable size.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity for a single order line.
///
/// Guards against fat-finger entries (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum price in cents for a single product ($1 billion).
///
/// Together with MAX_ORDER_LINES and MAX_LINE_QUANTITY this bounds any
/// order total at `100 × 999 × 10^11 ≈ 10^16`, comfortably inside i64, so
/// pricing arithmetic cannot overflow on validated input.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

/// Display name given to the distinguished walk-in client.
///
/// Every tenant gets exactly one walk-in client, created on demand. Its
/// balance is always zero: cash orders settle immediately and credit orders
/// against it are rejected (deferred payment needs a named client).
pub const WALK_IN_CLIENT_NAME: &str = "Walk-in";
