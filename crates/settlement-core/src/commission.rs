//! # Commission
//!
//! The marketplace commission: a channel-specific percent of the seller's
//! discounted price. Never of the buyer price.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{rate_amount, share_percent};
use crate::types::{CategoryCommissionSchedule, FulfillmentChannel};

/// Commission withheld on one sale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommissionCharge {
    pub amount: f64,
    /// Schedule rate applied, percent.
    pub rate: f64,
    /// Percent of the seller price. Equal to `rate` by construction.
    pub percent: f64,
}

/// Resolves the commission for a sale.
///
/// `amount = product_price * schedule.rate_for(channel) / 100`
///
/// Channels were normalized at parse time, so an unrecognized code has
/// already become FBW and gets the FBW rate here.
///
/// ## Example
/// ```rust
/// use settlement_core::commission::resolve_commission;
/// use settlement_core::{CategoryCommissionSchedule, FulfillmentChannel};
///
/// let schedule = CategoryCommissionSchedule { fbs: 18.0, ..CategoryCommissionSchedule::uniform(15.0) };
/// let charge = resolve_commission(1000.0, FulfillmentChannel::Fbs, &schedule);
/// assert_eq!(charge.rate, 18.0);
/// assert_eq!(charge.amount, 180.0);
/// ```
pub fn resolve_commission(
    product_price: f64,
    channel: FulfillmentChannel,
    schedule: &CategoryCommissionSchedule,
) -> CommissionCharge {
    let rate = schedule.rate_for(channel);
    let amount = rate_amount(product_price, rate);

    CommissionCharge {
        amount,
        rate,
        percent: share_percent(amount, product_price),
    }
}
