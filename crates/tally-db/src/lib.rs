//! # tally-db: Database Layer for Tally POS
//!
//! This crate provides storage for the Tally POS system: SQLite via sqlx
//! for async operations, embedded migrations, and the transactional core.
//!
//! ## Architecture Position
//! ```text
//! Settlement API handler (axum)
//!      │
//!      ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     tally-db (THIS CRATE)                       │
//! │                                                                 │
//! │   ┌───────────────┐   ┌────────────────┐   ┌──────────────┐    │
//! │   │   Database    │   │  Repositories  │   │  Migrations  │    │
//! │   │   (pool.rs)   │   │  product       │   │  (embedded)  │    │
//! │   │               │   │  client        │   │              │    │
//! │   │  SqlitePool   │◄──│  order  ★      │   │  001_init    │    │
//! │   │  WAL + FKs    │   │  report ★      │   │              │    │
//! │   └───────────────┘   └────────────────┘   └──────────────┘    │
//! │                                                                 │
//! │   ★ = transactional core (order engine, report aggregator)     │
//! └─────────────────────────────────────────────────────────────────┘
//!      │
//!      ▼
//! SQLite database file (or :memory: in tests)
//! ```
//!
//! ## Transaction Discipline
//!
//! Every operation that touches more than one row (create order, settle
//! credit, close day) opens one sqlx transaction at the start, and commits
//! or rolls back before returning. A failure at any internal step leaves no
//! partial state behind; stock and balances never diverge from the set of
//! committed orders.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, EngineError, EngineResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::client::{ClientRepository, NewClient};
pub use repository::order::{NewOrder, NewOrderLine, OrderRepository};
pub use repository::product::{NewProduct, ProductRepository, ProductUpdate};
pub use repository::report::ReportRepository;
