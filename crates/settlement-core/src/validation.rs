//! # Validation Module
//!
//! Preconditions checked before any fee is computed.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Field types, required fields                                      │
//! │  └── Unknown channel codes → FBW                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── seller price > 0                                                  │
//! │  ├── every number finite                                               │
//! │  └── percentages within 0..=100                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculators                                                  │
//! │  └── Assume valid input, apply documented fallbacks only               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Non-positive dimensions are not rejected here: they simply fail the
//! volume priority chain and fall through to the next source.
//!
//! ## Usage
//! ```rust
//! use settlement_core::validation::{validate_percent, validate_sale};
//! use settlement_core::SaleRecord;
//!
//! assert!(validate_sale(&SaleRecord::new("1", "Shoes", 990.0)).is_ok());
//! assert!(validate_sale(&SaleRecord::new("1", "Shoes", 0.0)).is_err());
//! assert!(validate_percent("taxRate", 120.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CategoryCommissionSchedule, SaleRecord, SettlementOptions};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Rejects NaN and infinities.
pub fn validate_finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a value that must be strictly positive.
///
/// ## Example
/// ```rust
/// use settlement_core::validation::validate_positive;
///
/// assert!(validate_positive("priceWithDiscount", 1.0).is_ok());
/// assert!(validate_positive("priceWithDiscount", 0.0).is_err());
/// assert!(validate_positive("priceWithDiscount", f64::NAN).is_err());
/// ```
pub fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;

    if value <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a value that may be zero but not negative.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

/// Validates a percentage on the 0-100 scale.
pub fn validate_percent(field: &str, value: f64) -> ValidationResult<()> {
    validate_finite(field, value)?;

    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
            value,
        });
    }

    Ok(())
}

/// Validates an optional value with `check`, skipping `None`.
fn validate_optional(
    field: &str,
    value: Option<f64>,
    check: fn(&str, f64) -> ValidationResult<()>,
) -> ValidationResult<()> {
    match value {
        Some(v) => check(field, v),
        None => Ok(()),
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a sale record.
///
/// ## Rules
/// - `productId` must not be empty
/// - `priceWithDiscount` must be positive (the 100% base for every percent)
/// - other prices and `costPrice` must not be negative
/// - `ktr`, when given, must be positive
/// - `returnRate`, when given, must be within 0..=100
/// - dimensions must be finite (sign is not checked)
pub fn validate_sale(sale: &SaleRecord) -> ValidationResult<()> {
    if sale.product_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "productId".to_string(),
        });
    }

    validate_positive("priceWithDiscount", sale.price_with_discount)?;
    validate_non_negative("originalPrice", sale.original_price)?;
    validate_optional(
        "priceWithMarketplaceDiscount",
        sale.price_with_marketplace_discount,
        validate_non_negative,
    )?;
    validate_optional("costPrice", sale.cost_price, validate_non_negative)?;
    validate_optional("ktr", sale.ktr, validate_positive)?;
    validate_optional("returnRate", sale.return_rate, validate_percent)?;

    let dims = &sale.dimensions;
    validate_optional("dimensions.lengthCm", dims.length_cm, validate_finite)?;
    validate_optional("dimensions.widthCm", dims.width_cm, validate_finite)?;
    validate_optional("dimensions.heightCm", dims.height_cm, validate_finite)?;
    validate_optional("dimensions.weightKg", dims.weight_kg, validate_finite)?;
    validate_optional("dimensions.volumeLiters", dims.volume_liters, validate_finite)?;

    Ok(())
}

/// Validates every rate of a commission schedule.
pub fn validate_schedule(schedule: &CategoryCommissionSchedule) -> ValidationResult<()> {
    validate_percent("commission.fbw", schedule.fbw)?;
    validate_percent("commission.fbs", schedule.fbs)?;
    validate_percent("commission.dbs", schedule.dbs)?;
    validate_percent("commission.clickAndCollect", schedule.click_and_collect)?;
    validate_percent("commission.express", schedule.express)?;

    Ok(())
}

/// Validates the seller-side options.
pub fn validate_options(options: &SettlementOptions) -> ValidationResult<()> {
    validate_percent("taxRate", options.tax_rate)?;
    validate_percent("advertisingPercent", options.advertising_percent)?;
    validate_non_negative("otherExpenses", options.other_expenses)?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
