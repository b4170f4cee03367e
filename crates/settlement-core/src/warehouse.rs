//! # Warehouse Tariffs
//!
//! Storage and acceptance, charged only when the marketplace warehouse
//! holds the stock (FBO / FBW).
//!
//! ## Tariffs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Known volume                 Unknown volume               │
//! │               ────────────                 ──────────────               │
//! │  Storage      0.5 × liters × days          price × 1.79% / 30 × days    │
//! │  Acceptance   0.4 × liters                 price × 0.22%                │
//! │                                                                         │
//! │  FBS / DBS / C&C / EDBS:  both are exactly 0                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{rate_amount, share_percent};
use crate::types::FulfillmentChannel;
use crate::volume::ResolvedVolume;

// =============================================================================
// Tariff Constants
// =============================================================================

/// Storage per liter per day.
pub const STORAGE_PER_LITER_DAY: f64 = 0.5;

/// Storage fallback, percent of seller price per 30 days.
pub const STORAGE_FALLBACK_MONTHLY_PERCENT: f64 = 1.79;

/// Days the monthly fallback percent covers.
const STORAGE_FALLBACK_PERIOD_DAYS: f64 = 30.0;

/// Acceptance per liter.
pub const ACCEPTANCE_PER_LITER: f64 = 0.4;

/// Acceptance fallback, percent of seller price.
pub const ACCEPTANCE_FALLBACK_PERCENT: f64 = 0.22;

// =============================================================================
// Storage
// =============================================================================

/// Storage charged on one sale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StorageCharge {
    pub amount: f64,
    /// Days of storage billed.
    pub days: u32,
    /// Percent of the seller price.
    pub percent: f64,
}

/// Storage cost for one sale.
pub fn storage_cost(
    product_price: f64,
    channel: FulfillmentChannel,
    volume: &ResolvedVolume,
    storage_days: u32,
) -> f64 {
    if !channel.is_warehouse_fulfilled() {
        return 0.0;
    }

    let days = f64::from(storage_days);
    match volume.liters() {
        Some(liters) => STORAGE_PER_LITER_DAY * liters * days,
        None => {
            rate_amount(product_price, STORAGE_FALLBACK_MONTHLY_PERCENT)
                / STORAGE_FALLBACK_PERIOD_DAYS
                * days
        }
    }
}

/// Storage cost wrapped with its billed days and percent.
pub fn storage_charge(
    product_price: f64,
    channel: FulfillmentChannel,
    volume: &ResolvedVolume,
    storage_days: u32,
) -> StorageCharge {
    let amount = storage_cost(product_price, channel, volume, storage_days);
    StorageCharge {
        amount,
        days: storage_days,
        percent: share_percent(amount, product_price),
    }
}

// =============================================================================
// Acceptance
// =============================================================================

/// Acceptance cost for one sale.
pub fn acceptance_cost(
    product_price: f64,
    channel: FulfillmentChannel,
    volume: &ResolvedVolume,
) -> f64 {
    if !channel.is_warehouse_fulfilled() {
        return 0.0;
    }

    match volume.liters() {
        Some(liters) => ACCEPTANCE_PER_LITER * liters,
        None => rate_amount(product_price, ACCEPTANCE_FALLBACK_PERCENT),
    }
}
