//! End-to-end settlement tests: JSON in, settlement and batch report out.

use std::collections::HashMap;

use chrono::Utc;
use settlement_core::{
    settle, BatchRun, CategoryCommissionSchedule, CommissionSchedules, FulfillmentChannel,
    SaleRecord, SettlementOptions, VolumeSource,
};

const EPS: f64 = 1e-6;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

const SALES_JSON: &str = r#"[
    {
        "productId": "184470512",
        "vendorCode": "DR-001",
        "category": "Dresses",
        "priceWithDiscount": 1000,
        "originalPrice": 1400,
        "channel": "FBW",
        "dimensions": { "lengthCm": 20, "widthCm": 15, "heightCm": 10 }
    },
    {
        "productId": "184470513",
        "category": "Dresses",
        "priceWithDiscount": 1000,
        "priceWithMarketplaceDiscount": 900,
        "fulfillmentChannel": "fbs",
        "dimensions": { "volumeLiters": 3 },
        "returnRate": 50
    },
    {
        "productId": "99001",
        "category": "Garden",
        "priceWithDiscount": 2500,
        "channel": "drone",
        "ktr": 1.2,
        "costPrice": 800,
        "orderDate": "2025-03-01T10:00:00Z"
    },
    {
        "productId": "bad",
        "category": "Dresses",
        "priceWithDiscount": -10
    }
]"#;

const SCHEDULES_JSON: &str = r#"{
    "Dresses": {
        "paidStorageKgvp": 15,
        "kgvpMarketplace": 18,
        "kgvpSupplier": 20,
        "kgvpPickup": 20,
        "kgvpSupplierExpress": 20
    }
}"#;

fn load() -> (Vec<SaleRecord>, CommissionSchedules) {
    let sales: Vec<SaleRecord> = serde_json::from_str(SALES_JSON).unwrap();
    let map: HashMap<String, CategoryCommissionSchedule> =
        serde_json::from_str(SCHEDULES_JSON).unwrap();
    (sales, CommissionSchedules::new(map))
}

#[test]
fn test_reference_sale_end_to_end() {
    let (sales, schedules) = load();
    let sale = &sales[0];

    assert_eq!(sale.channel, FulfillmentChannel::Fbw);
    let result = settle(sale, schedules.for_sale(sale), &SettlementOptions::default()).unwrap();

    let market = &result.marketplace_expenses;
    assert_close(market.commission.amount, 150.0);
    assert_close(market.logistics.outbound.amount, 74.0);
    assert_close(market.logistics.return_leg.amount, 0.0);
    assert_close(market.storage.amount, 45.0);
    assert_close(market.acceptance.amount, 1.2);
    assert_close(market.total.amount, 270.2);

    assert_close(result.amount_due_to_seller.amount, 729.8);

    let seller = &result.seller_expenses;
    assert_close(seller.taxes.amount, 43.788);
    assert_close(seller.cost_of_goods.amount, 370.0);
    assert!(seller.cost_of_goods.estimated);
    assert_close(seller.advertising.amount, 30.0);
    assert_close(seller.total.amount, 443.788);

    assert_close(result.profit.amount, 286.012);
    assert_close(result.profit.margin_percent_of_customer_price, 28.6012);
    assert_eq!(result.metadata.volume_source, VolumeSource::Dimensions);
}

#[test]
fn test_seller_fulfilled_sale_with_returns() {
    let (sales, schedules) = load();
    let sale = &sales[1];

    assert_eq!(sale.channel, FulfillmentChannel::Fbs);
    let result = settle(sale, schedules.for_sale(sale), &SettlementOptions::default()).unwrap();

    // Commission uses the seller price, not what the buyer paid
    assert_close(result.marketplace_expenses.commission.amount, 180.0);
    assert_close(result.marketplace_expenses.storage.amount, 0.0);
    assert_close(result.marketplace_expenses.acceptance.amount, 0.0);
    assert_close(result.marketplace_expenses.logistics.return_leg.amount, 25.0);
    assert_close(result.marketplace_expenses.logistics.total.amount, 99.0);

    assert_eq!(result.marketplace_funded_discount, None);
    assert_close(result.customer_price, 900.0);
    assert_close(
        result.profit.margin_percent_of_customer_price,
        result.profit.amount / 900.0 * 100.0,
    );
}

#[test]
fn test_unknown_category_and_channel_fall_back() {
    let (sales, schedules) = load();
    let sale = &sales[2];

    assert_eq!(sale.channel, FulfillmentChannel::Fbw);
    let result = settle(sale, schedules.for_sale(sale), &SettlementOptions::default()).unwrap();

    assert_close(result.marketplace_expenses.commission.rate, 25.0);
    assert_close(result.marketplace_expenses.commission.amount, 625.0);
    // Unknown volume: 14.67% of price, scaled by KTR
    assert_close(
        result.marketplace_expenses.logistics.outbound.amount,
        2500.0 * 0.1467 * 1.2,
    );
    assert_close(result.seller_expenses.cost_of_goods.amount, 800.0);
    assert!(!result.seller_expenses.cost_of_goods.estimated);
    assert_eq!(result.metadata.volume_source, VolumeSource::Unknown);
    assert!(result.metadata.order_date.is_some());
}

#[test]
fn test_batch_report() {
    let (sales, schedules) = load();
    let options = SettlementOptions::default();
    let report = BatchRun::new(&schedules, &options)
        .keep_settlements(true)
        .run(&sales);

    assert_eq!(report.totals.count, 3);
    let settlements = report.settlements.as_deref().unwrap();
    assert_eq!(settlements.len(), 3);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].product_id, "bad");

    let revenue: f64 = settlements.iter().map(|r| r.product_price).sum();
    assert_close(report.totals.revenue, revenue);
    assert_close(report.totals.revenue, 4500.0);

    let profit: f64 = settlements.iter().map(|r| r.profit.amount).sum();
    assert_close(report.totals.profit, profit);
    assert_close(report.totals.margin_percent, profit / 4500.0 * 100.0);

    assert_eq!(report.by_channel[&FulfillmentChannel::Fbw].count, 2);
    assert_eq!(report.by_channel[&FulfillmentChannel::Fbs].count, 1);
    assert_eq!(report.by_category["Dresses"].count, 2);
    assert_eq!(report.by_category["Garden"].count, 1);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let (mut sales, schedules) = load();
    let template = sales.clone();
    for i in 0..200 {
        let mut sale = template[i % template.len()].clone();
        sale.product_id = format!("{}-{i}", sale.product_id);
        sale.price_with_discount += i as f64;
        sales.push(sale);
    }

    let at = Utc::now();
    let options = SettlementOptions::default();
    let sequential = BatchRun::new(&schedules, &options).calculated_at(at).run(&sales);
    let parallel = BatchRun::new(&schedules, &options)
        .calculated_at(at)
        .run_parallel(&sales);

    assert_eq!(sequential.totals.count, parallel.totals.count);
    assert_eq!(sequential.rejected.len(), parallel.rejected.len());
    assert_close(sequential.totals.revenue, parallel.totals.revenue);
    assert_close(sequential.totals.profit, parallel.totals.profit);
    assert_close(sequential.totals.margin_percent, parallel.totals.margin_percent);

    for (category, group) in &sequential.by_category {
        let other = &parallel.by_category[category];
        assert_eq!(group.count, other.count);
        assert_close(group.margin_percent, other.margin_percent);
    }
}

#[test]
fn test_report_json_shape() {
    let (sales, schedules) = load();
    let options = SettlementOptions::default();
    let report = BatchRun::new(&schedules, &options).run(&sales);
    let json = serde_json::to_value(&report).unwrap();

    assert!(json["totals"]["marginPercent"].is_number());
    assert!(json["byChannel"]["FBW"]["revenue"].is_number());
    assert!(json["byCategory"]["Garden"]["profit"].is_number());
    assert_eq!(json["rejected"][0]["productId"], "bad");
}
