//! # Domain Types
//!
//! Input types consumed by the settlement calculator.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐   ┌──────────────────────────┐                │
//! │  │     SaleRecord      │   │ CategoryCommissionSchedule│               │
//! │  │  ─────────────────  │   │  ──────────────────────── │               │
//! │  │  product_id         │   │  fbw                      │               │
//! │  │  price_with_discount│   │  fbs                      │               │
//! │  │  channel ───────────┼──►│  dbs                      │               │
//! │  │  ktr                │   │  click_and_collect        │               │
//! │  │  dimensions         │   │  express                  │               │
//! │  │  return_rate        │   └──────────────────────────┘                │
//! │  │  cost_price         │                                               │
//! │  └─────────────────────┘   ┌──────────────────────────┐                │
//! │                            │   SettlementOptions       │               │
//! │  ┌─────────────────────┐   │  ──────────────────────── │               │
//! │  │ FulfillmentChannel  │   │  tax_rate        6%       │               │
//! │  │  FBO FBW FBS DBS    │   │  advertising     3%       │               │
//! │  │  C&C EDBS           │   │  other_expenses  0        │               │
//! │  └─────────────────────┘   │  storage_days    30       │               │
//! │                            └──────────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every optional field has exactly one fallback, applied by an accessor on
//! the owning type (`SaleRecord::ktr`, `SaleRecord::return_rate`, ...).
//! Calculators never look at the raw `Option`s.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::{
    DEFAULT_ADVERTISING_PERCENT, DEFAULT_COMMISSION_PERCENT, DEFAULT_KTR,
    DEFAULT_STORAGE_DAYS, DEFAULT_TAX_RATE,
};

// =============================================================================
// Fulfillment Channel
// =============================================================================

/// Which party stores and ships the item.
///
/// ## Channel Families
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Code   Who stores      Who ships       Commission    Storage/Accept.  │
/// │  ────   ──────────      ─────────       ──────────    ───────────────  │
/// │  FBO    marketplace     marketplace     fbw           charged          │
/// │  FBW    marketplace     marketplace     fbw           charged          │
/// │  FBS    seller          marketplace     fbs           zero             │
/// │  DBS    seller          seller          dbs           zero             │
/// │  C&C    seller          buyer pickup    c&c           zero             │
/// │  EDBS   seller          seller express  express       zero             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Unrecognized codes resolve to `Fbw`. This happens once, at parse /
/// deserialize time, so no calculator ever sees an unknown channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, TS,
)]
#[ts(export)]
pub enum FulfillmentChannel {
    /// Fulfilled by operator (marketplace warehouse).
    #[serde(rename = "FBO")]
    Fbo,
    /// Fulfilled by the marketplace warehouse. Default for unknown codes.
    #[default]
    #[serde(rename = "FBW")]
    Fbw,
    /// Seller stores, marketplace delivers.
    #[serde(rename = "FBS")]
    Fbs,
    /// Seller stores and delivers.
    #[serde(rename = "DBS")]
    Dbs,
    /// Buyer picks the item up from the seller.
    #[serde(rename = "C&C")]
    ClickAndCollect,
    /// Seller express delivery.
    #[serde(rename = "EDBS")]
    Express,
}

impl FulfillmentChannel {
    /// All channels, in report order.
    pub const ALL: [FulfillmentChannel; 6] = [
        FulfillmentChannel::Fbo,
        FulfillmentChannel::Fbw,
        FulfillmentChannel::Fbs,
        FulfillmentChannel::Dbs,
        FulfillmentChannel::ClickAndCollect,
        FulfillmentChannel::Express,
    ];

    /// Resolves a marketplace channel code, case-insensitively.
    ///
    /// ## Example
    /// ```rust
    /// use settlement_core::FulfillmentChannel;
    ///
    /// assert_eq!(FulfillmentChannel::from_code("fbs"), FulfillmentChannel::Fbs);
    /// assert_eq!(FulfillmentChannel::from_code("pickup"), FulfillmentChannel::ClickAndCollect);
    /// // Unknown codes are not an error
    /// assert_eq!(FulfillmentChannel::from_code("drone"), FulfillmentChannel::Fbw);
    /// ```
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "FBO" => FulfillmentChannel::Fbo,
            "FBW" => FulfillmentChannel::Fbw,
            "FBS" => FulfillmentChannel::Fbs,
            "DBS" => FulfillmentChannel::Dbs,
            "C&C" | "CC" | "PICKUP" => FulfillmentChannel::ClickAndCollect,
            "EDBS" | "EXPRESS" => FulfillmentChannel::Express,
            _ => FulfillmentChannel::Fbw,
        }
    }

    /// Returns the canonical marketplace code.
    pub const fn code(&self) -> &'static str {
        match self {
            FulfillmentChannel::Fbo => "FBO",
            FulfillmentChannel::Fbw => "FBW",
            FulfillmentChannel::Fbs => "FBS",
            FulfillmentChannel::Dbs => "DBS",
            FulfillmentChannel::ClickAndCollect => "C&C",
            FulfillmentChannel::Express => "EDBS",
        }
    }

    /// Returns true if the marketplace warehouse holds the stock.
    ///
    /// Only these channels are charged storage and acceptance.
    pub const fn is_warehouse_fulfilled(&self) -> bool {
        matches!(self, FulfillmentChannel::Fbo | FulfillmentChannel::Fbw)
    }
}

impl fmt::Display for FulfillmentChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FulfillmentChannel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FulfillmentChannel::from_code(s))
    }
}

impl<'de> Deserialize<'de> for FulfillmentChannel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = Option::<String>::deserialize(deserializer)?;
        Ok(code
            .as_deref()
            .map(FulfillmentChannel::from_code)
            .unwrap_or_default())
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// Package dimensions as reported by the product card.
///
/// Lengths are centimeters, weight kilograms, volume liters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(default)]
    pub length_cm: Option<f64>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Explicit volume. Wins over the L×W×H product when positive.
    #[serde(default)]
    pub volume_liters: Option<f64>,
}

impl Dimensions {
    /// Dimensions from L×W×H in centimeters.
    pub fn from_cm(length: f64, width: f64, height: f64) -> Self {
        Dimensions {
            length_cm: Some(length),
            width_cm: Some(width),
            height_cm: Some(height),
            ..Dimensions::default()
        }
    }

    /// Dimensions carrying only an explicit volume.
    pub fn from_liters(volume: f64) -> Self {
        Dimensions {
            volume_liters: Some(volume),
            ..Dimensions::default()
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One sold unit, as supplied by the product/price data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Marketplace article id.
    pub product_id: String,

    /// Seller's own article code.
    #[serde(default)]
    pub vendor_code: String,

    /// Category name, used for commission lookup and grouping.
    #[serde(default)]
    pub category: String,

    /// Marketplace subject id. Checked before the category name on lookup.
    #[serde(default)]
    pub subcategory_id: Option<u64>,

    /// Seller's discounted price. Base for commission and every percent
    /// except the profit margin.
    pub price_with_discount: f64,

    /// List price before the seller's discount.
    #[serde(default)]
    pub original_price: f64,

    /// What the buyer actually paid, when the marketplace adjusted it.
    #[serde(default)]
    pub price_with_marketplace_discount: Option<f64>,

    #[serde(default)]
    pub warehouse_name: Option<String>,

    #[serde(default, alias = "fulfillmentChannel")]
    pub channel: FulfillmentChannel,

    /// Warehouse logistics coefficient. Missing means 1.0.
    #[serde(default)]
    pub ktr: Option<f64>,

    #[serde(default)]
    pub dimensions: Dimensions,

    /// Legacy flag. Only consulted when `return_rate` is absent.
    #[serde(default)]
    pub is_returned: bool,

    /// Percent of units returned, 0-100.
    #[serde(default)]
    pub return_rate: Option<f64>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub order_date: Option<DateTime<Utc>>,

    /// Cost of goods per unit. Missing means the 37% estimate.
    #[serde(default)]
    pub cost_price: Option<f64>,
}

impl SaleRecord {
    /// Creates a record with only the required fields set.
    ///
    /// ## Example
    /// ```rust
    /// use settlement_core::{FulfillmentChannel, SaleRecord};
    ///
    /// let sale = SaleRecord::new("184470512", "Dresses", 1000.0);
    /// assert_eq!(sale.channel, FulfillmentChannel::Fbw);
    /// assert_eq!(sale.ktr(), 1.0);
    /// assert_eq!(sale.customer_price(), 1000.0);
    /// ```
    pub fn new(product_id: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        SaleRecord {
            product_id: product_id.into(),
            vendor_code: String::new(),
            category: category.into(),
            subcategory_id: None,
            price_with_discount: price,
            original_price: price,
            price_with_marketplace_discount: None,
            warehouse_name: None,
            channel: FulfillmentChannel::default(),
            ktr: None,
            dimensions: Dimensions::default(),
            is_returned: false,
            return_rate: None,
            order_date: None,
            cost_price: None,
        }
    }

    /// Seller price: the 100% base for commission and fee percentages.
    #[inline]
    pub fn product_price(&self) -> f64 {
        self.price_with_discount
    }

    /// Buyer price: the base for the profit margin only.
    ///
    /// Falls back to the seller price when the marketplace price is
    /// missing or not positive.
    pub fn customer_price(&self) -> f64 {
        match self.price_with_marketplace_discount {
            Some(price) if price > 0.0 => price,
            _ => self.price_with_discount,
        }
    }

    /// `customer_price - product_price`, reported only when positive.
    pub fn marketplace_funded_discount(&self) -> Option<f64> {
        let gap = self.customer_price() - self.product_price();
        (gap > 0.0).then_some(gap)
    }

    /// Warehouse coefficient, defaulting to 1.0.
    #[inline]
    pub fn ktr(&self) -> f64 {
        self.ktr.unwrap_or(DEFAULT_KTR)
    }

    /// Effective return rate in percent.
    ///
    /// Explicit rate wins; otherwise the legacy flag means 100%.
    pub fn return_rate(&self) -> f64 {
        match self.return_rate {
            Some(rate) => rate,
            None if self.is_returned => 100.0,
            None => 0.0,
        }
    }
}

// =============================================================================
// Commission Schedule
// =============================================================================

/// Commission rates (percent) for one category, one per channel family.
///
/// Field aliases accept the marketplace tariff export names, so a tariff
/// row can be deserialized directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCommissionSchedule {
    #[serde(alias = "paidStorageKgvp")]
    pub fbw: f64,
    #[serde(alias = "kgvpMarketplace")]
    pub fbs: f64,
    #[serde(alias = "kgvpSupplier")]
    pub dbs: f64,
    #[serde(alias = "kgvpPickup", alias = "click_and_collect")]
    pub click_and_collect: f64,
    #[serde(alias = "kgvpSupplierExpress")]
    pub express: f64,
}

impl CategoryCommissionSchedule {
    /// A schedule with the same rate on every channel.
    pub const fn uniform(rate: f64) -> Self {
        CategoryCommissionSchedule {
            fbw: rate,
            fbs: rate,
            dbs: rate,
            click_and_collect: rate,
            express: rate,
        }
    }

    /// Returns the rate for a channel. FBO shares the FBW rate.
    pub const fn rate_for(&self, channel: FulfillmentChannel) -> f64 {
        match channel {
            FulfillmentChannel::Fbo | FulfillmentChannel::Fbw => self.fbw,
            FulfillmentChannel::Fbs => self.fbs,
            FulfillmentChannel::Dbs => self.dbs,
            FulfillmentChannel::ClickAndCollect => self.click_and_collect,
            FulfillmentChannel::Express => self.express,
        }
    }
}

impl Default for CategoryCommissionSchedule {
    fn default() -> Self {
        CategoryCommissionSchedule::uniform(DEFAULT_COMMISSION_PERCENT)
    }
}

// =============================================================================
// Settlement Options
// =============================================================================

/// Seller-side assumptions shared by every sale in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettlementOptions {
    /// Tax on the amount due to the seller, percent.
    #[serde(default = "default_tax_rate", alias = "tax_rate")]
    pub tax_rate: f64,

    /// Advertising spend as percent of the seller price.
    #[serde(default = "default_advertising_percent", alias = "advertising_percent")]
    pub advertising_percent: f64,

    /// Flat extra expense per unit.
    #[serde(default, alias = "other_expenses")]
    pub other_expenses: f64,

    /// Days of paid storage charged per unit.
    #[serde(default = "default_storage_days", alias = "storage_days")]
    pub storage_days: u32,
}

fn default_tax_rate() -> f64 {
    DEFAULT_TAX_RATE
}

fn default_advertising_percent() -> f64 {
    DEFAULT_ADVERTISING_PERCENT
}

fn default_storage_days() -> u32 {
    DEFAULT_STORAGE_DAYS
}

impl Default for SettlementOptions {
    fn default() -> Self {
        SettlementOptions {
            tax_rate: default_tax_rate(),
            advertising_percent: default_advertising_percent(),
            other_expenses: 0.0,
            storage_days: default_storage_days(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_codes() {
        assert_eq!(FulfillmentChannel::from_code("FBO"), FulfillmentChannel::Fbo);
        assert_eq!(FulfillmentChannel::from_code(" dbs "), FulfillmentChannel::Dbs);
        assert_eq!(FulfillmentChannel::from_code("C&C"), FulfillmentChannel::ClickAndCollect);
        assert_eq!(FulfillmentChannel::from_code("edbs"), FulfillmentChannel::Express);
        assert_eq!(FulfillmentChannel::from_code(""), FulfillmentChannel::Fbw);
        assert_eq!(FulfillmentChannel::from_code("XYZ"), FulfillmentChannel::Fbw);
        assert_eq!(FulfillmentChannel::Express.to_string(), "EDBS");
    }

    #[test]
    fn test_channel_warehouse_gate() {
        let gated: Vec<_> = FulfillmentChannel::ALL
            .iter()
            .filter(|c| c.is_warehouse_fulfilled())
            .collect();
        assert_eq!(gated, vec![&FulfillmentChannel::Fbo, &FulfillmentChannel::Fbw]);
    }

    #[test]
    fn test_channel_deserialize_unknown_defaults_to_fbw() {
        let channel: FulfillmentChannel = serde_json::from_str("\"fbs\"").unwrap();
        assert_eq!(channel, FulfillmentChannel::Fbs);

        let channel: FulfillmentChannel = serde_json::from_str("\"SUPERMARKET\"").unwrap();
        assert_eq!(channel, FulfillmentChannel::Fbw);

        let channel: FulfillmentChannel = serde_json::from_str("null").unwrap();
        assert_eq!(channel, FulfillmentChannel::Fbw);

        assert_eq!(
            serde_json::to_string(&FulfillmentChannel::ClickAndCollect).unwrap(),
            "\"C&C\""
        );
    }

    #[test]
    fn test_sale_record_fallbacks() {
        let mut sale = SaleRecord::new("1", "Shoes", 1000.0);
        assert_eq!(sale.ktr(), 1.0);
        assert_eq!(sale.return_rate(), 0.0);
        assert_eq!(sale.customer_price(), 1000.0);
        assert_eq!(sale.marketplace_funded_discount(), None);

        sale.is_returned = true;
        assert_eq!(sale.return_rate(), 100.0);

        sale.return_rate = Some(20.0);
        assert_eq!(sale.return_rate(), 20.0);

        sale.price_with_marketplace_discount = Some(1100.0);
        assert_eq!(sale.customer_price(), 1100.0);
        assert_eq!(sale.marketplace_funded_discount(), Some(100.0));

        sale.price_with_marketplace_discount = Some(900.0);
        assert_eq!(sale.marketplace_funded_discount(), None);

        sale.price_with_marketplace_discount = Some(0.0);
        assert_eq!(sale.customer_price(), 1000.0);
    }

    #[test]
    fn test_sale_record_from_json() {
        let json = r#"{
            "productId": "184470512",
            "vendorCode": "DRESS-RED-42",
            "category": "Dresses",
            "subcategoryId": 69,
            "priceWithDiscount": 1000.0,
            "originalPrice": 2000.0,
            "fulfillmentChannel": "FBS",
            "ktr": 1.2,
            "dimensions": { "lengthCm": 20, "widthCm": 15, "heightCm": 10 },
            "returnRate": 12.5,
            "orderDate": "2024-03-01T10:00:00Z"
        }"#;
        let sale: SaleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(sale.channel, FulfillmentChannel::Fbs);
        assert_eq!(sale.subcategory_id, Some(69));
        assert_eq!(sale.ktr(), 1.2);
        assert_eq!(sale.dimensions.length_cm, Some(20.0));
        assert_eq!(sale.dimensions.volume_liters, None);
        assert_eq!(sale.return_rate(), 12.5);
        assert!(sale.order_date.is_some());
        assert!(sale.cost_price.is_none());
    }

    #[test]
    fn test_schedule_rate_for_channel() {
        let schedule = CategoryCommissionSchedule {
            fbw: 15.0,
            fbs: 17.0,
            dbs: 19.0,
            click_and_collect: 21.0,
            express: 23.0,
        };
        assert_eq!(schedule.rate_for(FulfillmentChannel::Fbo), 15.0);
        assert_eq!(schedule.rate_for(FulfillmentChannel::Fbw), 15.0);
        assert_eq!(schedule.rate_for(FulfillmentChannel::Fbs), 17.0);
        assert_eq!(schedule.rate_for(FulfillmentChannel::Dbs), 19.0);
        assert_eq!(schedule.rate_for(FulfillmentChannel::ClickAndCollect), 21.0);
        assert_eq!(schedule.rate_for(FulfillmentChannel::Express), 23.0);
    }

    #[test]
    fn test_schedule_accepts_tariff_export_names() {
        let json = r#"{
            "paidStorageKgvp": 24.5,
            "kgvpMarketplace": 26.5,
            "kgvpSupplier": 26.5,
            "kgvpPickup": 24.5,
            "kgvpSupplierExpress": 28.5
        }"#;
        let schedule: CategoryCommissionSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.fbw, 24.5);
        assert_eq!(schedule.express, 28.5);
    }

    #[test]
    fn test_options_default() {
        let options = SettlementOptions::default();
        assert_eq!(options.tax_rate, 6.0);
        assert_eq!(options.advertising_percent, 3.0);
        assert_eq!(options.other_expenses, 0.0);
        assert_eq!(options.storage_days, 30);

        let partial: SettlementOptions = serde_json::from_str(r#"{"taxRate": 15}"#).unwrap();
        assert_eq!(partial.tax_rate, 15.0);
        assert_eq!(partial.storage_days, 30);
    }
}
