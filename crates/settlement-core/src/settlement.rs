//! # Settlement Composer
//!
//! Turns one sale into a fully itemized breakdown: what the marketplace
//! withholds, what the seller spends, and the profit left over.
//!
//! ## Composition Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRecord ──► validate ──► productPrice > 0                           │
//! │                                                                         │
//! │  1. commission        = productPrice × rate(channel)                    │
//! │  2. volume            = resolved ONCE, shared by 3 and 4                │
//! │  3. logistics         = outbound(volume, ktr) + return(returnRate)      │
//! │  4. storage           = warehouse channels only                         │
//! │     acceptance        = warehouse channels only                         │
//! │  5. marketplace total = 1 + 3 + 4                                       │
//! │  6. due to seller     = productPrice − marketplace total                │
//! │  7. taxes             = due to seller × taxRate                         │
//! │     cost of goods     = costPrice  or  37% of productPrice              │
//! │     advertising       = productPrice × advertisingPercent               │
//! │     other             = otherExpenses                                   │
//! │  8. total expenses    = marketplace total + seller total                │
//! │     profit            = productPrice − total expenses                   │
//! │  9. margin            = profit / customerPrice                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every percent in the result is relative to `productPrice`, except the
//! profit margin which is relative to `customerPrice`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::commission::{resolve_commission, CommissionCharge};
use crate::error::CoreResult;
use crate::logistics::{outbound_logistics, return_logistics};
use crate::money::{rate_amount, share_percent, LineItem};
use crate::types::{
    CategoryCommissionSchedule, FulfillmentChannel, SaleRecord, SettlementOptions,
};
use crate::validation::{validate_finite, validate_options, validate_sale, validate_schedule};
use crate::volume::{resolve_volume, VolumeSource};
use crate::warehouse::{acceptance_cost, storage_charge, StorageCharge};
use crate::DEFAULT_COST_OF_GOODS_PERCENT;

// =============================================================================
// Result Types
// =============================================================================

/// Outbound and return logistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsCharges {
    pub outbound: LineItem,
    pub return_leg: LineItem,
    pub total: LineItem,
}

/// Everything the marketplace withholds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceExpenses {
    pub commission: CommissionCharge,
    pub logistics: LogisticsCharges,
    pub storage: StorageCharge,
    pub acceptance: LineItem,
    pub total: LineItem,
}

/// Tax on the amount due to the seller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxCharge {
    pub amount: f64,
    /// Tax rate applied, percent of the amount due to the seller.
    pub rate: f64,
    /// Percent of the seller price.
    pub percent: f64,
}

/// Cost of goods, supplied or estimated.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostOfGoods {
    pub amount: f64,
    pub percent: f64,
    /// True when no cost price was supplied and the 37% estimate was used.
    pub estimated: bool,
}

/// Everything the seller spends on top of marketplace fees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SellerExpenses {
    pub taxes: TaxCharge,
    pub cost_of_goods: CostOfGoods,
    pub advertising: LineItem,
    pub other: LineItem,
    pub total: LineItem,
}

/// Net profit of the sale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Profit {
    pub amount: f64,
    /// Profit as percent of what the buyer paid.
    pub margin_percent_of_customer_price: f64,
}

/// Context of a calculation, for display and grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementMetadata {
    pub product_id: String,
    pub vendor_code: String,
    pub channel: FulfillmentChannel,
    pub category: String,
    pub subcategory_id: Option<u64>,
    pub volume_liters: Option<f64>,
    pub volume_source: VolumeSource,
    pub ktr: f64,
    pub return_rate: f64,
    #[ts(as = "Option<String>")]
    pub order_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub calculated_at: DateTime<Utc>,
}

/// Itemized settlement of one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementResult {
    /// Seller price, the 100% base.
    pub product_price: f64,
    /// Buyer price, the margin base.
    pub customer_price: f64,
    /// Present only when the buyer paid more than the seller price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub marketplace_funded_discount: Option<f64>,
    pub marketplace_expenses: MarketplaceExpenses,
    pub amount_due_to_seller: LineItem,
    pub seller_expenses: SellerExpenses,
    pub total_expenses: LineItem,
    pub profit: Profit,
    pub metadata: SettlementMetadata,
}

// =============================================================================
// Composer
// =============================================================================

/// Settles one sale, stamping the result with the current time.
///
/// ## Errors
/// `CoreError::Validation` when the sale, schedule or options fail
/// validation; most commonly a seller price that is not positive.
pub fn settle(
    sale: &SaleRecord,
    schedule: &CategoryCommissionSchedule,
    options: &SettlementOptions,
) -> CoreResult<SettlementResult> {
    settle_at(sale, schedule, options, Utc::now())
}

/// Settles one sale with an explicit calculation timestamp.
///
/// Identical inputs always produce identical results.
pub fn settle_at(
    sale: &SaleRecord,
    schedule: &CategoryCommissionSchedule,
    options: &SettlementOptions,
    calculated_at: DateTime<Utc>,
) -> CoreResult<SettlementResult> {
    validate_sale(sale)?;
    validate_schedule(schedule)?;
    validate_options(options)?;

    let price = sale.product_price();
    let customer_price = sale.customer_price();
    let channel = sale.channel;
    let ktr = sale.ktr();
    let return_rate = sale.return_rate();

    // Marketplace side
    let commission = resolve_commission(price, channel, schedule);

    let volume = resolve_volume(&sale.dimensions);
    if !volume.is_known() {
        debug!(
            product_id = %sale.product_id,
            "Volume unknown, using price-percentage tariffs"
        );
    }

    let outbound = outbound_logistics(price, &volume, ktr);
    let return_leg = return_logistics(return_rate);
    let logistics_total = outbound + return_leg;

    let storage = storage_charge(price, channel, &volume, options.storage_days);
    let acceptance = acceptance_cost(price, channel, &volume);

    let marketplace_total = commission.amount + logistics_total + storage.amount + acceptance;
    let amount_due_to_seller = price - marketplace_total;

    // Seller side
    let taxes = rate_amount(amount_due_to_seller, options.tax_rate);
    let (cost_of_goods, estimated) = match sale.cost_price {
        Some(cost) => (cost, false),
        None => {
            debug!(
                product_id = %sale.product_id,
                "No cost price, estimating cost of goods"
            );
            (rate_amount(price, DEFAULT_COST_OF_GOODS_PERCENT), true)
        }
    };
    let advertising = rate_amount(price, options.advertising_percent);
    let other = options.other_expenses;
    let seller_total = taxes + cost_of_goods + advertising + other;

    let total_expenses = marketplace_total + seller_total;
    let profit = price - total_expenses;

    // Finite inputs can still overflow once multiplied out
    validate_finite("totalExpenses", total_expenses)?;
    validate_finite("profit", profit)?;
    let margin = if customer_price > 0.0 {
        profit / customer_price * 100.0
    } else {
        0.0
    };

    Ok(SettlementResult {
        product_price: price,
        customer_price,
        marketplace_funded_discount: sale.marketplace_funded_discount(),
        marketplace_expenses: MarketplaceExpenses {
            commission,
            logistics: LogisticsCharges {
                outbound: LineItem::of(outbound, price),
                return_leg: LineItem::of(return_leg, price),
                total: LineItem::of(logistics_total, price),
            },
            storage,
            acceptance: LineItem::of(acceptance, price),
            total: LineItem::of(marketplace_total, price),
        },
        amount_due_to_seller: LineItem::of(amount_due_to_seller, price),
        seller_expenses: SellerExpenses {
            taxes: TaxCharge {
                amount: taxes,
                rate: options.tax_rate,
                percent: share_percent(taxes, price),
            },
            cost_of_goods: CostOfGoods {
                amount: cost_of_goods,
                percent: share_percent(cost_of_goods, price),
                estimated,
            },
            advertising: LineItem::of(advertising, price),
            other: LineItem::of(other, price),
            total: LineItem::of(seller_total, price),
        },
        total_expenses: LineItem::of(total_expenses, price),
        profit: Profit {
            amount: profit,
            margin_percent_of_customer_price: margin,
        },
        metadata: SettlementMetadata {
            product_id: sale.product_id.clone(),
            vendor_code: sale.vendor_code.clone(),
            channel,
            category: sale.category.clone(),
            subcategory_id: sale.subcategory_id,
            volume_liters: volume.liters(),
            volume_source: volume.source(),
            ktr,
            return_rate,
            order_date: sale.order_date,
            calculated_at,
        },
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
