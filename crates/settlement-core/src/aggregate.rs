//! # Batch Aggregator
//!
//! Settles a batch of sales and rolls the results up by fulfillment
//! channel and by category.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Batch Aggregation                                │
//! │                                                                         │
//! │  sales ──┬── shard 1 ──► settle each ──► BatchTotals (sums only) ──┐   │
//! │          ├── shard 2 ──► settle each ──► BatchTotals (sums only) ──┼─┐ │
//! │          └── shard N ──► settle each ──► BatchTotals (sums only) ──┘ │ │
//! │                                                                      │ │
//! │                                  merge (commutative, associative) ◄──┘ │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                  finish()  ── margins computed ONCE    │
//! │                                              │  from the merged sums    │
//! │                                              ▼                          │
//! │                                        AggregateReport                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Margin Rule
//! A group's margin is `group.profit / group.revenue × 100`, computed from
//! the summed values. It is never the mean of per-sale margins, and it is
//! never computed per shard: partial totals carry sums only.
//!
//! ## Schedule Lookup
//! subcategory id ──► category name ──► default schedule. Missing
//! schedules are a documented fallback, not an error.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::share_percent;
use crate::settlement::{settle_at, SettlementResult};
use crate::types::{CategoryCommissionSchedule, FulfillmentChannel, SaleRecord, SettlementOptions};

// =============================================================================
// Commission Schedule Lookup
// =============================================================================

/// Resolves the schedule for a sale from a read-only map.
///
/// Lookup order: subcategory id (decimal string key), category name,
/// then `default`. Returns the schedule and whether a specific entry was
/// found.
pub fn resolve_schedule<'a>(
    schedules: &'a HashMap<String, CategoryCommissionSchedule>,
    default: &'a CategoryCommissionSchedule,
    subcategory_id: Option<u64>,
    category: &str,
) -> (&'a CategoryCommissionSchedule, bool) {
    let by_id = subcategory_id.and_then(|id| schedules.get(&id.to_string()));

    match by_id.or_else(|| schedules.get(category)) {
        Some(schedule) => (schedule, true),
        None => (default, false),
    }
}

/// Category → commission schedule map with a default.
///
/// Built once by the caller and shared read-only by every worker.
#[derive(Debug, Clone, Default)]
pub struct CommissionSchedules {
    by_key: HashMap<String, CategoryCommissionSchedule>,
    default: CategoryCommissionSchedule,
}

impl CommissionSchedules {
    /// Creates a lookup over `by_key` with the built-in default schedule.
    pub fn new(by_key: HashMap<String, CategoryCommissionSchedule>) -> Self {
        CommissionSchedules {
            by_key,
            default: CategoryCommissionSchedule::default(),
        }
    }

    /// Replaces the default schedule.
    pub fn with_default(mut self, default: CategoryCommissionSchedule) -> Self {
        self.default = default;
        self
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Returns the schedule that applies to a sale.
    pub fn for_sale(&self, sale: &SaleRecord) -> &CategoryCommissionSchedule {
        let (schedule, found) =
            resolve_schedule(&self.by_key, &self.default, sale.subcategory_id, &sale.category);
        if !found {
            debug!(
                product_id = %sale.product_id,
                category = %sale.category,
                "No commission schedule for category, using default"
            );
        }
        schedule
    }
}

// =============================================================================
// Report Types
// =============================================================================

/// Totals for one group of sales.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub count: usize,
    /// Sum of seller prices.
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
    /// `profit / revenue × 100` over the summed values.
    pub margin_percent: f64,
}

/// A sale excluded from the batch, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSale {
    pub product_id: String,
    pub reason: String,
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    pub totals: GroupSummary,
    pub by_channel: BTreeMap<FulfillmentChannel, GroupSummary>,
    pub by_category: BTreeMap<String, GroupSummary>,
    /// Sales that failed validation. Excluded from every total.
    pub rejected: Vec<RejectedSale>,
    /// Per-sale results, when the run was asked to keep them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub settlements: Option<Vec<SettlementResult>>,
    #[ts(as = "String")]
    pub calculated_at: DateTime<Utc>,
}

// =============================================================================
// Partial Sums
// =============================================================================

/// Running sums for one group. Carries no margin on purpose.
#[derive(Debug, Clone, Copy, Default)]
struct GroupSums {
    count: usize,
    revenue: f64,
    expenses: f64,
    profit: f64,
}

impl GroupSums {
    fn add(&mut self, result: &SettlementResult) {
        self.count += 1;
        self.revenue += result.product_price;
        self.expenses += result.total_expenses.amount;
        self.profit += result.profit.amount;
    }

    fn merge(&mut self, other: &GroupSums) {
        self.count += other.count;
        self.revenue += other.revenue;
        self.expenses += other.expenses;
        self.profit += other.profit;
    }

    fn summarize(&self) -> GroupSummary {
        GroupSummary {
            count: self.count,
            revenue: self.revenue,
            expenses: self.expenses,
            profit: self.profit,
            margin_percent: share_percent(self.profit, self.revenue),
        }
    }
}

/// Mergeable partial totals of a batch.
///
/// Callers sharding across processes can build one `BatchTotals` per shard,
/// `merge` them in any order, and `finish` once.
#[derive(Debug, Clone, Default)]
pub struct BatchTotals {
    totals: GroupSums,
    by_channel: BTreeMap<FulfillmentChannel, GroupSums>,
    by_category: BTreeMap<String, GroupSums>,
    rejected: Vec<RejectedSale>,
    settlements: Vec<SettlementResult>,
    keep_settlements: bool,
}

impl BatchTotals {
    /// Empty totals that discard per-sale results after summing them.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty totals that also keep every per-sale result.
    pub fn keeping_settlements() -> Self {
        BatchTotals {
            keep_settlements: true,
            ..Self::default()
        }
    }

    /// Number of accepted sales so far.
    pub fn accepted(&self) -> usize {
        self.totals.count
    }

    /// Number of rejected sales so far.
    pub fn rejected(&self) -> usize {
        self.rejected.len()
    }

    /// Adds one settled sale.
    pub fn add(&mut self, result: SettlementResult) {
        self.totals.add(&result);
        self.by_channel
            .entry(result.metadata.channel)
            .or_default()
            .add(&result);
        self.by_category
            .entry(result.metadata.category.clone())
            .or_default()
            .add(&result);

        if self.keep_settlements {
            self.settlements.push(result);
        }
    }

    /// Records a sale that could not be settled.
    pub fn reject(&mut self, product_id: impl Into<String>, reason: impl Into<String>) {
        self.rejected.push(RejectedSale {
            product_id: product_id.into(),
            reason: reason.into(),
        });
    }

    /// Adds the outcome of settling one sale.
    pub fn ingest(&mut self, outcome: CoreResult<SettlementResult>) {
        match outcome {
            Ok(result) => self.add(result),
            Err(CoreError::SaleRejected { product_id, source }) => {
                self.reject(product_id, source.to_string())
            }
            Err(other) => self.reject(String::new(), other.to_string()),
        }
    }

    /// Merges another partial total into this one.
    pub fn merge(mut self, other: BatchTotals) -> Self {
        self.totals.merge(&other.totals);
        for (channel, sums) in &other.by_channel {
            self.by_channel.entry(*channel).or_default().merge(sums);
        }
        for (category, sums) in &other.by_category {
            self.by_category
                .entry(category.clone())
                .or_default()
                .merge(sums);
        }
        self.rejected.extend(other.rejected);
        self.settlements.extend(other.settlements);
        self.keep_settlements |= other.keep_settlements;
        self
    }

    /// Computes every margin from the merged sums and builds the report.
    pub fn finish(self, calculated_at: DateTime<Utc>) -> AggregateReport {
        AggregateReport {
            totals: self.totals.summarize(),
            by_channel: self
                .by_channel
                .iter()
                .map(|(channel, sums)| (*channel, sums.summarize()))
                .collect(),
            by_category: self
                .by_category
                .iter()
                .map(|(category, sums)| (category.clone(), sums.summarize()))
                .collect(),
            rejected: self.rejected,
            settlements: self.keep_settlements.then_some(self.settlements),
            calculated_at,
        }
    }
}

// =============================================================================
// Batch Run
// =============================================================================

/// One batch run: shared schedules, options and timestamp.
#[derive(Debug, Clone)]
pub struct BatchRun<'a> {
    schedules: &'a CommissionSchedules,
    options: &'a SettlementOptions,
    keep_settlements: bool,
    calculated_at: DateTime<Utc>,
}

impl<'a> BatchRun<'a> {
    /// Creates a run stamped with the current time.
    pub fn new(schedules: &'a CommissionSchedules, options: &'a SettlementOptions) -> Self {
        BatchRun {
            schedules,
            options,
            keep_settlements: false,
            calculated_at: Utc::now(),
        }
    }

    /// Keeps every per-sale result in the report.
    pub fn keep_settlements(mut self, keep: bool) -> Self {
        self.keep_settlements = keep;
        self
    }

    /// Overrides the calculation timestamp.
    pub fn calculated_at(mut self, at: DateTime<Utc>) -> Self {
        self.calculated_at = at;
        self
    }

    fn empty_totals(&self) -> BatchTotals {
        if self.keep_settlements {
            BatchTotals::keeping_settlements()
        } else {
            BatchTotals::new()
        }
    }

    /// Settles one sale against its category schedule.
    ///
    /// Validation failures come back as `CoreError::SaleRejected` carrying
    /// the product id.
    pub fn settle_one(&self, sale: &SaleRecord) -> CoreResult<SettlementResult> {
        let schedule = self.schedules.for_sale(sale);
        settle_at(sale, schedule, self.options, self.calculated_at).map_err(|err| {
            let source = match err {
                CoreError::Validation(source) | CoreError::SaleRejected { source, .. } => source,
            };
            warn!(product_id = %sale.product_id, error = %source, "Sale rejected");
            CoreError::SaleRejected {
                product_id: sale.product_id.clone(),
                source,
            }
        })
    }

    /// Runs the batch on the current thread.
    pub fn run(&self, sales: &[SaleRecord]) -> AggregateReport {
        let totals = sales.iter().fold(self.empty_totals(), |mut acc, sale| {
            acc.ingest(self.settle_one(sale));
            acc
        });

        self.finish(totals)
    }

    /// Runs the batch across the rayon thread pool.
    ///
    /// Each worker folds its shard into a `BatchTotals`; shards are merged
    /// and margins computed once at the end.
    pub fn run_parallel(&self, sales: &[SaleRecord]) -> AggregateReport {
        let totals = sales
            .par_iter()
            .fold(
                || self.empty_totals(),
                |mut acc, sale| {
                    acc.ingest(self.settle_one(sale));
                    acc
                },
            )
            .reduce(|| self.empty_totals(), BatchTotals::merge);

        self.finish(totals)
    }

    fn finish(&self, totals: BatchTotals) -> AggregateReport {
        info!(
            accepted = totals.accepted(),
            rejected = totals.rejected(),
            "Settlement batch complete"
        );
        totals.finish(self.calculated_at)
    }
}

/// Settles and aggregates a batch sequentially.
pub fn aggregate(
    sales: &[SaleRecord],
    schedules: &CommissionSchedules,
    options: &SettlementOptions,
) -> AggregateReport {
    BatchRun::new(schedules, options).run(sales)
}

/// Settles and aggregates a batch on the rayon thread pool.
pub fn aggregate_parallel(
    sales: &[SaleRecord],
    schedules: &CommissionSchedules,
    options: &SettlementOptions,
) -> AggregateReport {
    BatchRun::new(schedules, options).run_parallel(sales)
}

// =============================================================================
// Unit Tests
// =============================================================================
