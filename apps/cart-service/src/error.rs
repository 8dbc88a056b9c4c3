//! # API Error Type
//!
//! Unified error type for cart commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  StoreError ──► CartError ──► ApiError { code, message } ──► caller    │
//! │                                                                         │
//! │  CartError::InvalidRowId              → NOT_FOUND                       │
//! │  CartError::Invalid{Item,Quantity,..} → VALIDATION_ERROR                │
//! │  CartError::InvalidInstance           → INVALID_INSTANCE                │
//! │  CartError::UnknownAssociatedModel    → UNKNOWN_MODEL                   │
//! │  CartError::Store / StoreError        → STORAGE_ERROR                   │
//! │  anything else                        → INTERNAL                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use ilacart_core::{CartError, StoreError};

/// API error returned from cart commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Row not found in cart instance 'main': 9f2c..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Row or command not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Empty cart instance name
    InvalidInstance,

    /// Model name not registered for association
    UnknownModel,

    /// Session store failed
    StorageError,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts cart errors to API errors.
impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidRowId { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CartError::InvalidInstance => {
                ApiError::new(ErrorCode::InvalidInstance, err.to_string())
            }
            CartError::UnknownAssociatedModel { .. } => {
                ApiError::new(ErrorCode::UnknownModel, err.to_string())
            }
            CartError::Store(e) => ApiError::from(e),
            e if e.is_validation() => ApiError::validation(e.to_string()),
            e => ApiError::internal(e.to_string()),
        }
    }
}

/// Converts store errors to API errors.
///
/// The underlying cause is logged, the caller only sees a generic message.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!("Session store failed: {}", err);
        ApiError::new(ErrorCode::StorageError, "Cart session could not be read or saved")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        error!("Response serialization failed: {}", err);
        ApiError::internal("Response could not be encoded")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
