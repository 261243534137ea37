//! # Error Types
//!
//! Domain-specific error types for tagcheck-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tagcheck-core errors (this file)                                      │
//! │  ├── CoreError        - Precondition not met (state untouched)         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tagcheck-scan errors (separate crate)                                 │
//! │  └── ScanError        - Config loading, wraps CoreError                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ScanError → caller / UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no fatal error class in the core. Every variant below is a
//! recoverable "precondition not met": the operation that returned it left
//! the session exactly as it was.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Precondition failures for session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The order has been confirmed and the cart is locked.
    ///
    /// ## When This Occurs
    /// - `add_to_cart` / `clear_cart` after `confirm_order`
    /// - Changing the order id or name after confirmation
    #[error("Order is confirmed; the cart can no longer be changed")]
    OrderLocked,

    /// Confirming an order that has no lines.
    #[error("Cannot confirm an empty order")]
    EmptyOrder,

    /// Placing an item before the order is confirmed.
    #[error("Order must be confirmed before items can be placed")]
    OrderNotConfirmed,

    /// Placing an item with nothing selected.
    #[error("No item selected for placement")]
    NoItemSelected,

    /// Initiating a scan with an empty package.
    ///
    /// ## User Workflow
    /// ```text
    /// initiate_scan()
    ///      │
    ///      ▼
    /// placed items: 0
    ///      │
    ///      ▼
    /// NoPlacedItems ──► UI shows "add items to the package before scanning"
    /// ```
    #[error("Add items to the package before scanning")]
    NoPlacedItems,

    /// Moving the scanner while no scan session is active.
    #[error("No scan in progress")]
    NotScanning,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
