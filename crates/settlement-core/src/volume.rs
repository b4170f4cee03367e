//! # Volume Resolution
//!
//! Works out the shipment volume in liters, or admits it is unknown.
//!
//! ## Priority Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. dimensions.volume_liters > 0        ──► Explicit(v)                 │
//! │            │ otherwise                                                  │
//! │            ▼                                                            │
//! │  2. length, width, height all > 0       ──► Dimensions(L*W*H / 1000)    │
//! │            │ otherwise                                                  │
//! │            ▼                                                            │
//! │  3.                                     ──► Unknown                     │
//! │                                             (tariffs fall back to a    │
//! │                                              percent of the price)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Non-finite values, including an L×W×H product that overflows, never
//! count as a known volume.
//!
//! The volume is resolved once per sale and reused by outbound logistics,
//! storage and acceptance.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Dimensions;

/// Cubic centimeters per liter.
const CM3_PER_LITER: f64 = 1000.0;

/// Where a resolved volume came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum VolumeSource {
    /// Explicit liters from the product card.
    Explicit,
    /// Computed from L×W×H.
    Dimensions,
    /// Neither was usable.
    #[default]
    Unknown,
}

/// Outcome of the volume priority chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedVolume {
    Explicit(f64),
    Dimensions(f64),
    Unknown,
}

impl ResolvedVolume {
    /// Volume in liters, if known. Always positive when `Some`.
    #[inline]
    pub fn liters(&self) -> Option<f64> {
        match *self {
            ResolvedVolume::Explicit(v) | ResolvedVolume::Dimensions(v) => Some(v),
            ResolvedVolume::Unknown => None,
        }
    }

    /// Where the volume came from.
    pub fn source(&self) -> VolumeSource {
        match self {
            ResolvedVolume::Explicit(_) => VolumeSource::Explicit,
            ResolvedVolume::Dimensions(_) => VolumeSource::Dimensions,
            ResolvedVolume::Unknown => VolumeSource::Unknown,
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        !matches!(self, ResolvedVolume::Unknown)
    }
}

/// Resolves shipment volume from a product's dimensions.
///
/// ## Example
/// ```rust
/// use settlement_core::{resolve_volume, Dimensions, ResolvedVolume};
///
/// let dims = Dimensions::from_cm(20.0, 15.0, 10.0);
/// assert_eq!(resolve_volume(&dims), ResolvedVolume::Dimensions(3.0));
///
/// let dims = Dimensions { volume_liters: Some(1.5), ..Dimensions::from_cm(20.0, 15.0, 10.0) };
/// assert_eq!(resolve_volume(&dims), ResolvedVolume::Explicit(1.5));
///
/// assert_eq!(resolve_volume(&Dimensions::default()), ResolvedVolume::Unknown);
/// ```
pub fn resolve_volume(dimensions: &Dimensions) -> ResolvedVolume {
    let usable = |v: &f64| *v > 0.0 && v.is_finite();

    if let Some(volume) = dimensions.volume_liters.filter(usable) {
        return ResolvedVolume::Explicit(volume);
    }

    let side = |length: Option<f64>| length.filter(usable);
    match (
        side(dimensions.length_cm),
        side(dimensions.width_cm),
        side(dimensions.height_cm),
    ) {
        // The product can overflow even when every side is finite
        (Some(l), Some(w), Some(h)) => Some(l * w * h / CM3_PER_LITER)
            .filter(usable)
            .map_or(ResolvedVolume::Unknown, ResolvedVolume::Dimensions),
        _ => ResolvedVolume::Unknown,
    }
}
