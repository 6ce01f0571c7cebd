//! API error types and HTTP status mapping.
//!
//! ## Status Mapping
//! ```text
//! ValidationError, walk-in + credit      → 400 Bad Request
//! missing / invalid bearer token         → 401 Unauthorized
//! Product/Client/Order not found         → 404 Not Found
//! insufficient stock, already settled,
//! duplicate report, referenced product   → 409 Conflict
//! store failure                          → 500 Internal Server Error
//! pool exhausted (retryable)             → 503 Service Unavailable
//! ```
//! Every error body is `{ "code": ..., "message": ... }` so callers can
//! branch on the code and show the message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use tally_core::CoreError;
use tally_db::{DbError, EngineError};

/// Machine-readable error category carried in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Store,
    Unavailable,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Store => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// What the HTTP caller sees.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Validation, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();

        // Store failures get logged server-side; the caller only learns
        // that the store failed, not how.
        if status.is_server_error() {
            error!(code = ?self.code, message = %self.message, "Request failed");
        }

        let body = ErrorBody {
            code: self.code,
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) | CoreError::CreditRequiresNamedClient => {
                ErrorCode::Validation
            }
            CoreError::ProductNotFound(_)
            | CoreError::ClientNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. }
            | CoreError::NotCreditOrder { .. }
            | CoreError::ReportAlreadyExists { .. } => ErrorCode::Conflict,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::PoolExhausted => ApiError::new(
                ErrorCode::Unavailable,
                "Store is busy, retry shortly".to_string(),
            ),
            _ => ApiError::new(ErrorCode::Store, "Store operation failed".to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(core) => core.into(),
            EngineError::Db(db) => db.into(),
        }
    }
}
