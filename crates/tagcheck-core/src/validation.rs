//! # Validation Module
//!
//! Input validation for operator actions.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end                                                    │
//! │  ├── Parse / default malformed numbers (range "" → 80)                 │
//! │  └── Package boundary check on clicks                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── quantity 1..=99, names non-blank                                  │
//! │  └── scan range 20..=200                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Session state rules (ledger lock, selection, scan state)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_NAME_LEN, MAX_ORDER_QUANTITY, MAX_SCAN_RANGE, MIN_SCAN_RANGE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an add-to-cart quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ORDER_QUANTITY (99)
///
/// ```rust
/// use tagcheck_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(100).is_err());
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > i64::from(MAX_ORDER_QUANTITY) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ORDER_QUANTITY),
        });
    }

    Ok(qty as u32)
}

/// Validates an item name and returns it trimmed.
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    validate_text("name", name)
}

/// Validates an operator-supplied order id or order name.
pub fn validate_order_field(field: &str, value: &str) -> ValidationResult<String> {
    validate_text(field, value)
}

fn validate_text(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates a scanner range.
///
/// A zero range would stall the sweep (vertical advance is half the range),
/// so the lower bound is enforced here rather than in the sweep.
pub fn validate_scan_range(range: f64) -> ValidationResult<f64> {
    if !range.is_finite() || range < MIN_SCAN_RANGE || range > MAX_SCAN_RANGE {
        return Err(ValidationError::OutOfRange {
            field: "range".to_string(),
            min: MIN_SCAN_RANGE as i64,
            max: MAX_SCAN_RANGE as i64,
        });
    }

    Ok(range)
}
