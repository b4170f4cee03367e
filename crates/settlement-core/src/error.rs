//! # Error Types
//!
//! Domain-specific error types for settlement-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  settlement-core errors (this file)                                    │
//! │  ├── CoreError        - General calculator errors                      │
//! │  └── ValidationError  - Rejected inputs (preconditions)                │
//! │                                                                         │
//! │  settlement-cli errors (separate crate)                                │
//! │  └── CliError         - Config, file and JSON failures                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → stderr / exit code 1   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT An Error
//! Fallbacks are policy, not failures:
//! - unknown fulfillment channel → FBW
//! - missing dimensions → percentage-of-price tariffs
//! - missing cost price → 37% estimate
//! - missing category schedule → default schedule
//!
//! Only inputs that would make the arithmetic meaningless (non-positive
//! seller price, NaN, out-of-range percentages) are rejected.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Settlement calculator errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale record or option failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A sale record in a batch failed validation.
    ///
    /// Carries the product id so the rejected record can be traced back
    /// to the marketplace listing.
    #[error("Sale {product_id} rejected: {source}")]
    SaleRejected {
        product_id: String,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any fee is computed, so a rejected record never
/// produces a partially computed result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive, got {value}")]
    MustBePositive { field: String, value: f64 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value is NaN or infinite.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },
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
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "priceWithDiscount".to_string(),
            value: 0.0,
        };
        assert_eq!(err.to_string(), "priceWithDiscount must be positive, got 0");

        let err = ValidationError::OutOfRange {
            field: "returnRate".to_string(),
            min: 0.0,
            max: 100.0,
            value: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "returnRate must be between 0 and 100, got 120"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::NotFinite {
            field: "ktr".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_sale_rejected_message() {
        let err = CoreError::SaleRejected {
            product_id: "184470512".to_string(),
            source: ValidationError::Required {
                field: "productId".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Sale 184470512 rejected: productId is required"
        );
    }
}
