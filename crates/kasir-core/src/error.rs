//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Cart / checkout rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kasir-client errors (separate crate)                                  │
//! │  └── ClientError      - Authentication, request, decode failures       │
//! │                                                                         │
//! │  console errors (in app)                                               │
//! │  └── ConsoleError     - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → ConsoleError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors are `Clone` because a single failed fetch can be handed to several
//! deduplicated callers in kasir-client.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations detected before anything reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Checkout was requested on a cart with no lines.
    #[error("Nothing to buy: the cart is empty")]
    EmptyCart,

    /// The tendered amount does not cover the cart total.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total: Rp 20.000
    ///      │
    ///      ▼
    /// pay 15000
    ///      │
    ///      ▼
    /// InsufficientPayment { payment: Rp 15.000, total: Rp 20.000 }
    ///      │
    ///      ▼
    /// No request is sent, cart is untouched
    /// ```
    #[error("Insufficient payment: {payment} tendered, {total} due")]
    InsufficientPayment { payment: Money, total: Money },

    /// A line subtotal or the cart total does not fit in [`Money`].
    #[error("Cart total is too large to check out")]
    TotalOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when operator input doesn't meet requirements and are raised
/// before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-numeric amount, malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is lower than a related field allows.
    #[error("{field} must not be below {other}")]
    BelowField { field: String, other: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
