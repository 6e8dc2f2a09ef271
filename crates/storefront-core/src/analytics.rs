//! # Analytics
//!
//! Derives the dashboard numbers from the current inventory and sales
//! snapshots. Pure and deterministic: the clock is an argument, and
//! malformed data degrades to zero instead of failing.
//!
//! ## Aggregation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items ──► id → Item map (cost lookup)                                  │
//! │                                                                         │
//! │  for each sale (one pass):                                              │
//! │    total  = effective_total()                                           │
//! │    cogs   = Σ cost_price × qty   (vanished items contribute 0)         │
//! │    profit = unpaid ? 0 : total − cogs                                   │
//! │      │                                                                  │
//! │      ├──► lifetime   (always, also undated sales)                       │
//! │      ├──► today      (same calendar day as now)                         │
//! │      ├──► week       (timestamp ≥ now − 7 days)                         │
//! │      ├──► month      (same calendar month) ──► daily_revenue[day − 1]   │
//! │      └──► best sellers by item name                                     │
//! │                                                                         │
//! │  items ──► stock value, low stock, out of stock                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Calendar predicates use the time zone of `now`, so passing
//! `Local::now()` gives the shop's local day boundaries.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Item, Sale};
use crate::{BEST_SELLER_LIMIT, WEEK_WINDOW_DAYS};

/// Name used on the best-seller board for lines without one.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown item";

/// Revenue and profit of one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PeriodTotals {
    pub revenue: Money,
    pub profit: Money,
}

impl PeriodTotals {
    fn add(&mut self, revenue: Money, profit: Money) {
        self.revenue += revenue;
        self.profit += profit;
    }
}

/// One entry on the best-seller board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BestSeller {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Metrics {
    pub today: PeriodTotals,
    /// Σ effective total of today's unpaid sales.
    pub today_pending: Money,
    /// Rolling window: the last seven days up to now.
    pub week: PeriodTotals,
    pub month: PeriodTotals,
    pub lifetime: PeriodTotals,
    pub lifetime_pending: Money,

    /// Revenue per day of the current month, index = day − 1.
    pub daily_revenue: Vec<Money>,

    pub item_count: usize,
    /// Σ cost price × stock.
    pub stock_value: Money,
    pub low_stock: Vec<Item>,
    pub out_of_stock: Vec<Item>,

    pub best_sellers: Vec<BestSeller>,

    pub sale_count: usize,
    pub units_sold: i64,
}

/// Computes the dashboard metrics.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use storefront_core::analytics::compute_metrics;
///
/// let metrics = compute_metrics(&[], &[], &Utc::now());
/// assert!(metrics.lifetime.revenue.is_zero());
/// assert!(metrics.best_sellers.is_empty());
/// ```
pub fn compute_metrics<Tz: TimeZone>(items: &[Item], sales: &[Sale], now: &DateTime<Tz>) -> Metrics {
    let by_id: HashMap<&str, &Item> = items.iter().map(|i| (i.id.as_str(), i)).collect();

    let tz = now.timezone();
    let today = now.date_naive();
    let week_start = now.clone() - Duration::days(WEEK_WINDOW_DAYS);

    let mut metrics = Metrics {
        daily_revenue: vec![Money::zero(); days_in_month(today.year(), today.month())],
        ..Default::default()
    };

    let mut seller_index: HashMap<String, usize> = HashMap::new();
    let mut sellers: Vec<BestSeller> = Vec::new();

    for sale in sales {
        let total = sale.effective_total();
        let unpaid = sale.is_unpaid();

        let mut cost_of_goods = Money::zero();
        for line in sale.lines.lines() {
            if let Some(item) = line.item_id.as_deref().and_then(|id| by_id.get(id)) {
                cost_of_goods += item.cost_price.multiply_quantity(line.quantity);
            }

            let name = if line.item_name.trim().is_empty() {
                UNKNOWN_ITEM_NAME
            } else {
                line.item_name.as_str()
            };
            let idx = *seller_index.entry(name.to_string()).or_insert_with(|| {
                sellers.push(BestSeller {
                    name: name.to_string(),
                    quantity: 0,
                    revenue: Money::zero(),
                });
                sellers.len() - 1
            });
            sellers[idx].quantity = sellers[idx].quantity.saturating_add(line.quantity);
            sellers[idx].revenue += line.line_total;

            metrics.units_sold = metrics.units_sold.saturating_add(line.quantity);
        }

        let profit = if unpaid { Money::zero() } else { total - cost_of_goods };
        let pending = if unpaid { total } else { Money::zero() };

        metrics.sale_count += 1;
        metrics.lifetime.add(total, profit);
        metrics.lifetime_pending += pending;

        let Some(ts) = sale.timestamp else {
            continue;
        };
        let local = ts.with_timezone(&tz);
        let day = local.date_naive();

        if day == today {
            metrics.today.add(total, profit);
            metrics.today_pending += pending;
        }
        if local >= week_start {
            metrics.week.add(total, profit);
        }
        if day.year() == today.year() && day.month() == today.month() {
            metrics.month.add(total, profit);
            if total.is_positive() {
                if let Some(slot) = metrics.daily_revenue.get_mut(day.day0() as usize) {
                    *slot += total;
                }
            }
        }
    }

    metrics.item_count = items.len();
    metrics.stock_value = items.iter().map(Item::stock_value).sum();
    metrics.low_stock = items.iter().filter(|i| i.is_low_stock()).cloned().collect();
    metrics.out_of_stock = items.iter().filter(|i| i.is_out_of_stock()).cloned().collect();

    // stable: ties keep first-encountered order
    sellers.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    sellers.truncate(BEST_SELLER_LIMIT);
    metrics.best_sellers = sellers;

    metrics
}

/// Number of days in a calendar month (28 to 31).
pub fn days_in_month(year: i32, month: u32) -> usize {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(year, month, 1)
        .zip(NaiveDate::from_ymd_opt(next_year, next_month, 1))
        .map(|(start, end)| (end - start).num_days() as usize)
        .unwrap_or(31)
}

// =============================================================================
// Unit Tests
// =============================================================================
