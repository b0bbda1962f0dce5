//! # Validation Module
//!
//! Input validation for item fields and quantities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI widgets                                                   │
//! │  ├── Spin boxes, non-empty fields                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Inventory model (Rust)                                       │
//! │  └── THIS MODULE: field and quantity rules                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  └── UNIQUE (code)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_code, validate_quantity};
//!
//! let code = validate_code("  004 ").unwrap();
//! assert_eq!(code, "004");
//!
//! assert_eq!(validate_quantity(12).unwrap(), 12);
//! assert!(validate_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_FIELD_LENGTH, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
///
/// Inner spaces are kept: codes typed by hand or imported from CSV may
/// carry them, and lookups must still find those rows.
pub fn validate_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    Ok(code.to_string())
}

/// Validates an item name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 255 characters
pub fn validate_item_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock quantity (add, edit, quantity-only edit).
///
/// ## Rules
/// - Zero is allowed (item out of stock)
/// - Must not be negative
/// - Must fit a signed 32-bit `INT` column
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if !(0..=MAX_QUANTITY as i64).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_QUANTITY as i64,
        });
    }

    Ok(qty as u32)
}

/// Validates the number of units added by one scan.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must fit a signed 32-bit `INT` column
pub fn validate_scan_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    validate_quantity(qty)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert_eq!(validate_code("004").unwrap(), "004");
        assert_eq!(validate_code("  W-123 ").unwrap(), "W-123");
        assert!(validate_code("A,B").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert_eq!(validate_code(" AB 12 ").unwrap(), "AB 12");
        assert!(validate_code(&"A".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert_eq!(validate_item_name(" Drill ").unwrap(), "Drill");
        assert!(validate_item_name("Šrafciger 5mm").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(0).unwrap(), 0);
        assert_eq!(validate_quantity(15).unwrap(), 15);
        assert_eq!(validate_quantity(i32::MAX as i64).unwrap(), MAX_QUANTITY);

        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(i32::MAX as i64 + 1).is_err());
    }

    #[test]
    fn test_validate_scan_quantity() {
        assert_eq!(validate_scan_quantity(3).unwrap(), 3);
        assert!(validate_scan_quantity(0).is_err());
        assert!(validate_scan_quantity(-3).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  drill ").unwrap(), "drill");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }
}
