//! # Error Types
//!
//! Domain-specific error types for ilacart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ilacart-core errors (this file)                                       │
//! │  ├── CartError   - Every failure a cart operation can raise            │
//! │  └── StoreError  - Session backend failures (I/O, JSON, backend)       │
//! │                                                                         │
//! │  cart-service errors (host glue)                                       │
//! │  └── ApiError    - What the storefront sees (serialized)               │
//! │                                                                         │
//! │  Flow: StoreError → CartError → ApiError → Storefront                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Not-Found Is Not An Error
//! Queries (`get`, `contents`, `search`, aggregate getters) return `Option`
//! for "nothing there". Only mutations that reference a row raise
//! [`CartError::InvalidRowId`].

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors raised by cart operations.
///
/// Validation variants are raised before anything is written to the session,
/// so a failed insert or update leaves the stored cart untouched.
#[derive(Debug, Error)]
pub enum CartError {
    /// Instance selector was given an empty name.
    #[error("Cart instance name must not be empty")]
    InvalidInstance,

    /// `associate()` was given a model that the registry cannot resolve.
    #[error("Unknown associated model: {model}")]
    UnknownAssociatedModel { model: String },

    /// A required item field is missing or empty.
    ///
    /// ## When This Occurs
    /// - `id` or `name` is absent or blank
    /// - `quantity` is absent, blank or zero
    /// - `price` is absent
    /// - A JSON update patch names an attribute rows don't have
    #[error("Invalid cart item: {field} is required")]
    InvalidItem { field: String },

    /// Quantity is present but not a positive whole number, or is so large
    /// that a row or cart amount would leave the range of [`Money`].
    ///
    /// [`Money`]: crate::money::Money
    #[error("Invalid quantity: {value}")]
    InvalidQuantity { value: String },

    /// Price is present but not a non-negative number.
    #[error("Invalid price: {value}")]
    InvalidPrice { value: String },

    /// Discount is present but not a non-negative number.
    #[error("Invalid discount: {value}")]
    InvalidDiscount { value: String },

    /// Tax is present but not a non-negative number.
    #[error("Invalid tax: {value}")]
    InvalidTax { value: String },

    /// Update/remove referenced a row id absent from the current instance.
    #[error("Row not found in cart instance '{instance}': {row_id}")]
    InvalidRowId { instance: String, row_id: String },

    /// The session backend failed.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl CartError {
    /// Creates an InvalidItem error for a field.
    pub fn missing(field: impl Into<String>) -> Self {
        CartError::InvalidItem {
            field: field.into(),
        }
    }

    /// Returns `true` for the input-validation family of errors.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CartError::InvalidItem { .. }
                | CartError::InvalidQuantity { .. }
                | CartError::InvalidPrice { .. }
                | CartError::InvalidDiscount { .. }
                | CartError::InvalidTax { .. }
        )
    }

    /// Amounts for `quantity` units no longer fit in cents.
    pub fn amount_overflow(quantity: i64) -> Self {
        CartError::InvalidQuantity {
            value: format!("{} (amount out of range)", quantity),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Session store failures.
///
/// ## Error Mapping
/// ```text
/// std::io::Error       → StoreError::Io
/// serde_json::Error    → StoreError::Serialization
/// anything else        → StoreError::Backend
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for CartError {
    fn from(err: serde_json::Error) -> Self {
        CartError::Store(StoreError::Serialization(err))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

/// Result type for session store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
