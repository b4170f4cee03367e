//! # Logistics Tariffs
//!
//! Outbound delivery to the buyer and the return leg back to the seller.
//!
//! ## Outbound Tariff Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Volume (liters)        Tariff                                          │
//! │  ───────────────        ──────                                          │
//! │  (0.0, 0.2]             23 per liter × volume                           │
//! │  (0.2, 0.4]             26 per liter × volume                           │
//! │  (0.4, 0.6]             29 per liter × volume                           │
//! │  (0.6, 0.8]             30 per liter × volume                           │
//! │  (0.8, 1.0]             32 per liter × volume                           │
//! │  > 1.0                  46 for the first liter + 14 per extra liter     │
//! │                         (linear, fractional liters count)               │
//! │                                                                         │
//! │  unknown volume         14.67% of the seller price                      │
//! │                                                                         │
//! │  Either way the result is multiplied by the warehouse KTR.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Upper bounds are inclusive: exactly 0.2 liters is billed at 23, not 26.

use crate::money::rate_amount;
use crate::volume::ResolvedVolume;

// =============================================================================
// Tariff Constants
// =============================================================================

/// Small-parcel tiers: (inclusive upper bound in liters, rate per liter).
pub const OUTBOUND_TIERS: [(f64, f64); 5] = [
    (0.2, 23.0),
    (0.4, 26.0),
    (0.6, 29.0),
    (0.8, 30.0),
    (1.0, 32.0),
];

/// Base tariff covering the first liter of a parcel over one liter.
pub const OUTBOUND_FIRST_LITER: f64 = 46.0;

/// Tariff per liter beyond the first.
pub const OUTBOUND_EXTRA_LITER: f64 = 14.0;

/// Outbound fallback when volume is unknown, percent of seller price.
pub const OUTBOUND_FALLBACK_PERCENT: f64 = 14.67;

/// Flat return-leg fee per returned unit.
pub const RETURN_FEE_PER_UNIT: f64 = 50.0;

// =============================================================================
// Outbound Logistics
// =============================================================================

/// Base outbound tariff for a known, positive volume, before KTR.
///
/// ## Example
/// ```rust
/// use settlement_core::logistics::outbound_base_tariff;
///
/// assert_eq!(outbound_base_tariff(1.5), 53.0);
/// assert_eq!(outbound_base_tariff(3.0), 74.0);
/// ```
pub fn outbound_base_tariff(volume_liters: f64) -> f64 {
    OUTBOUND_TIERS
        .iter()
        .find(|(upper, _)| volume_liters <= *upper)
        .map(|(_, rate)| rate * volume_liters)
        .unwrap_or_else(|| OUTBOUND_FIRST_LITER + (volume_liters - 1.0) * OUTBOUND_EXTRA_LITER)
}

/// Outbound logistics for one sale.
///
/// Known volume uses the tier table, unknown volume a percent of the
/// seller price. Both are scaled by `ktr`.
pub fn outbound_logistics(product_price: f64, volume: &ResolvedVolume, ktr: f64) -> f64 {
    match volume.liters() {
        Some(liters) => outbound_base_tariff(liters) * ktr,
        None => rate_amount(product_price, OUTBOUND_FALLBACK_PERCENT) * ktr,
    }
}

// =============================================================================
// Return Logistics
// =============================================================================

/// Return-leg logistics for one sale.
///
/// A flat fee per returned unit, scaled by the share of units returned.
/// Independent of volume and channel.
///
/// ## Example
/// ```rust
/// use settlement_core::logistics::return_logistics;
///
/// assert_eq!(return_logistics(50.0), 25.0);
/// assert_eq!(return_logistics(0.0), 0.0);
/// ```
pub fn return_logistics(return_rate: f64) -> f64 {
    if return_rate <= 0.0 {
        return 0.0;
    }

    rate_amount(RETURN_FEE_PER_UNIT, return_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn known(liters: f64) -> ResolvedVolume {
        ResolvedVolume::Explicit(liters)
    }

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert!((outbound_logistics(1000.0, &known(0.2), 1.0) - 23.0 * 0.2).abs() < EPS);
        assert!((outbound_logistics(1000.0, &known(0.4), 1.0) - 26.0 * 0.4).abs() < EPS);
        assert!((outbound_logistics(1000.0, &known(1.0), 1.0) - 32.0).abs() < EPS);
    }

    #[test]
    fn test_mid_tier() {
        // 0.5 liters sits in the (0.4, 0.6] tier
        assert!((outbound_base_tariff(0.5) - 29.0 * 0.5).abs() < EPS);
        assert!((outbound_base_tariff(0.21) - 26.0 * 0.21).abs() < EPS);
        assert!((outbound_base_tariff(0.75) - 30.0 * 0.75).abs() < EPS);
    }

    #[test]
    fn test_over_one_liter_is_linear() {
        assert!((outbound_logistics(1000.0, &known(1.5), 1.0) - 53.0).abs() < EPS);
        assert!((outbound_logistics(1000.0, &known(3.0), 1.0) - 74.0).abs() < EPS);
        assert!((outbound_logistics(1000.0, &known(1.5), 1.2) - 53.0 * 1.2).abs() < EPS);
    }

    #[test]
    fn test_ktr_scales_tier_tariff() {
        let base = outbound_logistics(1000.0, &known(0.2), 1.0);
        let scaled = outbound_logistics(1000.0, &known(0.2), 2.5);
        assert!((scaled - base * 2.5).abs() < EPS);
    }

    #[test]
    fn test_unknown_volume_falls_back_to_price_percent() {
        let amount = outbound_logistics(1000.0, &ResolvedVolume::Unknown, 1.0);
        assert!((amount - 146.7).abs() < EPS);

        let amount = outbound_logistics(1000.0, &ResolvedVolume::Unknown, 1.5);
        assert!((amount - 146.7 * 1.5).abs() < EPS);
    }

    #[test]
    fn test_return_logistics() {
        assert_eq!(return_logistics(100.0), 50.0);
        assert_eq!(return_logistics(50.0), 25.0);
        assert!((return_logistics(10.0) - 5.0).abs() < EPS);
        assert_eq!(return_logistics(0.0), 0.0);
        assert_eq!(return_logistics(-5.0), 0.0);
    }
}
