//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Inventory rule violations                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockroom-db / stockroom-files errors (separate crates)               │
//! │  ├── DbError          - Record store failures                          │
//! │  └── ConfigError, MirrorError, LocalLogError                           │
//! │                                                                         │
//! │  stockroom-app errors                                                  │
//! │  └── ApiError         - What the UI sees (feedback text + code)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → ApiError → UI          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Inventory rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No item carries the given product code.
    ///
    /// ## When This Occurs
    /// - Scanning a code that was never added
    /// - Editing or removing an item another action already removed
    #[error("Product code '{0}' not found")]
    ItemNotFound(String),

    /// Another item already uses this product code.
    ///
    /// Raised by the flat-file source, which has no UNIQUE index to lean on.
    #[error("Product code '{0}' already exists")]
    DuplicateCode(String),

    /// Incrementing the quantity would exceed what the schema can store.
    #[error("Quantity of '{code}' cannot grow by {delta} (currently {current})")]
    QuantityOverflow {
        code: String,
        current: u32,
        delta: u32,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before anything is written.
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
