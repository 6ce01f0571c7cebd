//! # Tally Settlement API
//!
//! The REST boundary of Tally POS: axum handlers over the tally-db order
//! engine and report aggregator.
//!
//! ## Layering
//! ```text
//! HTTP request
//!      │  bearer JWT → AuthTenant (tenant scoping)
//!      ▼
//! routes::*           thin handlers, wire DTOs
//!      │
//!      ▼
//! tally-db            repositories, transactions
//!      │
//!      ▼
//! tally-core          pricing, validation, domain types
//! ```
//! Handlers never hold business logic; they translate wire shapes and map
//! errors to status codes. The library form exists so integration tests can
//! drive the router without binding a socket.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

pub use auth::{AuthTenant, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use routes::{router, AppState};
