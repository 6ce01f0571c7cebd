//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! tally-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! tally-db errors (separate crate)
//! └── DbError          - Database operation failures
//!
//! Settlement API errors (apps/api)
//! └── ApiError         - What the HTTP caller sees (status + JSON body)
//!
//! Flow: ValidationError → CoreError → EngineError → ApiError → caller
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, order id, ...)
//! 3. Errors are enum variants, never bare Strings
//! 4. Conflict-class errors (stock, duplicate report, double settle) are
//!    distinct variants so the boundary can answer 409

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations raised by the order engine and
/// report aggregator. They map to 4xx responses at the API boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not resolve for this tenant.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Client id does not resolve for this tenant.
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    /// Order id does not resolve for this tenant.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Not enough stock to satisfy an order line.
    ///
    /// Raised inside the order transaction; the whole order rolls back and
    /// no stock or balance mutation survives.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Settlement was requested for an order that is not an open credit
    /// order (it was paid cash, or it was already settled).
    ///
    /// This is a hard conflict, never a silent no-op: settling twice would
    /// double-decrement the client balance.
    #[error("Order {order_id} is {state}, only open credit orders can be settled")]
    NotCreditOrder { order_id: String, state: String },

    /// A report snapshot already exists for this tenant and day.
    #[error("Report already exists for {date}")]
    ReportAlreadyExists { date: String },

    /// Credit (deferred payment) requires a named client; the walk-in
    /// client never carries a balance.
    #[error("Credit orders require a named client, not the walk-in client")]
    CreditRequiresNamedClient,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, before any
/// business logic runs or any row is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that must not be empty is empty.
    #[error("{field} must not be empty")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for p-1: available 3, requested 5"
        );
    }

    #[test]
    fn test_settlement_conflict_message() {
        let err = CoreError::NotCreditOrder {
            order_id: "o-1".to_string(),
            state: "cash".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order o-1 is cash, only open credit orders can be settled"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
