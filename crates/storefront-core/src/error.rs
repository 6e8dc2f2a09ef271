//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Storage and transaction failures               │
//! │                                                                         │
//! │  CLI (binary)                                                          │
//! │  └── anyhow::Error    - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → anyhow → terminal       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Malformed historical data is NOT an error anywhere in this crate: the
//! document normaliser coerces it to zero instead.

use thiserror::Error;

use crate::types::PaymentMethod;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are raised before any write is attempted, so they never leave a
/// partial effect behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item referenced by a cart or update does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Requested quantity exceeds the stock shown when the cart was built.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check snapshot stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Pen", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Pen in stock"
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// A sale needs at least one cart line.
    #[error("Cart is empty")]
    EmptyCart,

    /// The only legal payment transition is unpaid → paid.
    #[error("Cannot change payment of sale {sale_id} from {from} to {to}")]
    InvalidPaymentTransition {
        sale_id: String,
        from: PaymentMethod,
        to: PaymentMethod,
    },

    /// A share link needs a buyer phone number with at least one digit.
    #[error("No WhatsApp number available for this buyer")]
    MissingPhoneNumber,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
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

    /// Invalid format (e.g., unknown payment method, bad owner id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
