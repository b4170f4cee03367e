//! # Money Module
//!
//! Percent arithmetic shared by every calculator, and the `LineItem`
//! amount/percent pair that every expense line is reported as.
//!
//! ## Why f64 Here?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ESTIMATES, NOT LEDGER ENTRIES                                          │
//! │                                                                         │
//! │  A settlement breakdown is a forecast: 14.67% of price, 1.79%/30 per   │
//! │  day, 0.5 per liter-day. Rounding each line to kopecks would make      │
//! │  batch totals drift from the sum of the unrounded lines.               │
//! │                                                                         │
//! │  RULE: keep full f64 precision end to end.                             │
//! │        Only the display layer rounds.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All percentages are on a 0-100 scale.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Percent Helpers
// =============================================================================

/// Applies a percentage rate to a base amount.
///
/// ## Example
/// ```rust
/// use settlement_core::money::rate_amount;
///
/// assert_eq!(rate_amount(1000.0, 15.0), 150.0);
/// assert_eq!(rate_amount(1000.0, 0.0), 0.0);
/// ```
#[inline]
pub fn rate_amount(base: f64, rate_percent: f64) -> f64 {
    base * rate_percent / 100.0
}

/// Expresses `amount` as a percent of `base`.
///
/// A zero base yields 0 rather than NaN/Infinity. Callers that require a
/// positive base validate it before reaching here.
///
/// ## Example
/// ```rust
/// use settlement_core::money::share_percent;
///
/// assert_eq!(share_percent(150.0, 1000.0), 15.0);
/// assert_eq!(share_percent(150.0, 0.0), 0.0);
/// ```
#[inline]
pub fn share_percent(amount: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        amount / base * 100.0
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// An amount and its percent of the seller price.
///
/// ## Where LineItems Appear
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  productPrice = 1000 ──────────────────────────── 100% base             │
/// │                                                                         │
/// │  commission        150.0   15.00%                                       │
/// │  logistics.total    74.0    7.40%                                       │
/// │  storage            45.0    4.50%                                       │
/// │  acceptance          1.2    0.12%                                       │
/// │  ...                                                                    │
/// │                                                                         │
/// │  profit margin is the ONE exception: it is relative to customerPrice   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub amount: f64,
    /// Percent of the seller price.
    pub percent: f64,
}

impl LineItem {
    /// Creates a line item, deriving its percent of `base`.
    #[inline]
    pub fn of(amount: f64, base: f64) -> Self {
        LineItem {
            amount,
            percent: share_percent(amount, base),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
