//! # settlement-core: Marketplace Settlement Calculator
//!
//! Given one sale of a product on a marketplace, this crate reconstructs
//! everything the marketplace withholds and everything the seller spends,
//! and what is left as profit. It also rolls batches of sales up by
//! fulfillment channel and by category.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Seller Dashboard Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Dashboard (React) / HTTP API / settlement-cli      │   │
//! │  │   fetch prices, dimensions, tariffs ──► build SaleRecords       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ SaleRecord + schedule + options        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ settlement-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │  commission ─┐                                                  │   │
//! │  │  volume ─────┼──► logistics ─┐                                  │   │
//! │  │              └──► warehouse ─┼──► settlement ──► aggregate      │   │
//! │  │                              │   (one sale)      (a batch)      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Inputs (SaleRecord, FulfillmentChannel, schedules, options)
//! - [`money`] - Percent helpers and the `LineItem` amount/percent pair
//! - [`commission`] - Commission by channel
//! - [`volume`] - Shipment volume resolution
//! - [`logistics`] - Outbound and return logistics tariffs
//! - [`warehouse`] - Storage and acceptance tariffs
//! - [`settlement`] - One sale, fully itemized
//! - [`aggregate`] - Batches, grouped by channel and category
//! - [`validation`] - Input preconditions
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, no hidden state
//! 2. **No Intermediate Rounding**: full f64 precision until display
//! 3. **One Fallback, One Place**: each optional input is defaulted once
//! 4. **Fail Fast**: a non-positive seller price is an error, never NaN
//!
//! ## Example Usage
//!
//! ```rust
//! use settlement_core::{
//!     settle, CategoryCommissionSchedule, Dimensions, SaleRecord, SettlementOptions,
//! };
//!
//! let mut sale = SaleRecord::new("184470512", "Dresses", 1000.0);
//! sale.dimensions = Dimensions::from_cm(20.0, 15.0, 10.0); // 3 liters
//!
//! let schedule = CategoryCommissionSchedule { fbw: 15.0, ..CategoryCommissionSchedule::uniform(20.0) };
//! let result = settle(&sale, &schedule, &SettlementOptions::default()).unwrap();
//!
//! assert!((result.marketplace_expenses.commission.amount - 150.0).abs() < 1e-9);
//! assert!((result.marketplace_expenses.logistics.outbound.amount - 74.0).abs() < 1e-9);
//! assert!((result.profit.amount - 286.012).abs() < 1e-9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod commission;
pub mod error;
pub mod logistics;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;
pub mod volume;
pub mod warehouse;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{
    aggregate, aggregate_parallel, resolve_schedule, AggregateReport, BatchRun, BatchTotals,
    CommissionSchedules, GroupSummary, RejectedSale,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::LineItem;
pub use settlement::{settle, settle_at, SettlementResult};
pub use types::*;
pub use volume::{resolve_volume, ResolvedVolume, VolumeSource};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Warehouse logistics coefficient when the warehouse reports none.
pub const DEFAULT_KTR: f64 = 1.0;

/// Default tax on the amount due to the seller (simplified tax regime).
pub const DEFAULT_TAX_RATE: f64 = 6.0;

/// Default advertising spend, percent of seller price.
pub const DEFAULT_ADVERTISING_PERCENT: f64 = 3.0;

/// Default paid storage period in days.
pub const DEFAULT_STORAGE_DAYS: u32 = 30;

/// Cost of goods estimate when no cost price is known, percent of seller price.
pub const DEFAULT_COST_OF_GOODS_PERCENT: f64 = 37.0;

/// Commission used for every channel of the default schedule.
///
/// Substituted when a category has no schedule of its own.
pub const DEFAULT_COMMISSION_PERCENT: f64 = 25.0;
