//! # Repository Layer
//!
//! Repository pattern implementations for database access.
//!
//! ## Design
//! Each repository owns a cloned pool handle and encapsulates the SQL for
//! one entity. Handlers never write SQL; they call repository methods.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Repository Layer                       │
//! │                                                          │
//! │  ProductRepository   - catalog CRUD, guarded stock edits │
//! │  ClientRepository    - client ledger, walk-in bootstrap  │
//! │  OrderRepository     - order engine (transactional)      │
//! │  ReportRepository    - report aggregator (transactional) │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Scoping
//! Every method takes a `tenant_id` and every statement filters on it.
//! A well-formed id belonging to another tenant behaves exactly like a
//! nonexistent id: not found, never a different error.

pub mod client;
pub mod order;
pub mod product;
pub mod report;
