//! Order statistics for the approval dashboard.
//!
//! The database crate groups the orders matching every filter except status
//! into one row per status and report day. Those buckets are folded here so
//! the status filter can apply to the totals while the status distribution
//! still covers every status.

use chrono::{Duration, NaiveDate};
use playdesk_shared::types::round_money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::workflow::types::OrderStatus;

/// Number of days covered by the daily trend, counting back from today.
pub const TREND_DAYS: i64 = 30;

/// Orders sharing a workflow status and report day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsRow {
    /// Current workflow status.
    pub status: OrderStatus,
    /// Day the orders were reported.
    pub report_date: NaiveDate,
    /// Number of orders in the bucket.
    pub order_count: u64,
    /// Sum of booked hours.
    pub duration_hours: Decimal,
    /// Sum of final prices.
    pub final_price: Decimal,
}

/// Order count for one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// The status.
    pub status: OrderStatus,
    /// Display label of the status.
    pub label: &'static str,
    /// Number of orders in it.
    pub count: u64,
}

/// Orders reported on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTrend {
    /// Report day.
    pub date: NaiveDate,
    /// Orders reported that day.
    pub count: u64,
    /// Sum of their final prices.
    pub amount: Decimal,
}

/// Aggregated order figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderStatistics {
    /// Orders matching all filters.
    pub total_count: u64,
    /// Sum of booked hours.
    pub total_hours: Decimal,
    /// Sum of final prices.
    pub total_amount: Decimal,
    /// `total_amount × commission_rate`.
    pub total_commission: Decimal,
    /// `total_amount / total_count`, zero when there are no orders.
    pub average_price: Decimal,
    /// Counts per status, ignoring the status filter.
    pub status_distribution: Vec<StatusCount>,
    /// Per-day counts for the last [`TREND_DAYS`] days, newest first.
    pub daily_trend: Vec<DailyTrend>,
}

impl OrderStatistics {
    /// Folds the per-status, per-day buckets in `rows`.
    ///
    /// `status` narrows the totals and trend; the distribution always covers
    /// all rows.
    #[must_use]
    pub fn compute(
        rows: &[StatisticsRow],
        status: Option<OrderStatus>,
        commission_rate: Decimal,
        today: NaiveDate,
    ) -> Self {
        let matching: Vec<&StatisticsRow> = rows
            .iter()
            .filter(|row| status.is_none_or(|s| row.status == s))
            .collect();

        let total_count: u64 = matching.iter().map(|row| row.order_count).sum();
        let total_hours: Decimal = matching.iter().map(|row| row.duration_hours).sum();
        let total_amount: Decimal = matching.iter().map(|row| row.final_price).sum();
        let average_price = if total_count == 0 {
            Decimal::ZERO
        } else {
            round_money(total_amount / Decimal::from(total_count))
        };

        let status_distribution = OrderStatus::ALL
            .iter()
            .map(|s| StatusCount {
                status: *s,
                label: s.label(),
                count: rows
                    .iter()
                    .filter(|row| row.status == *s)
                    .map(|row| row.order_count)
                    .sum(),
            })
            .collect();

        let since = today - Duration::days(TREND_DAYS);
        let mut by_day: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();
        for row in matching.iter().filter(|row| row.report_date >= since) {
            let day = by_day.entry(row.report_date).or_insert((0, Decimal::ZERO));
            day.0 += row.order_count;
            day.1 += row.final_price;
        }
        let daily_trend = by_day
            .into_iter()
            .rev()
            .map(|(date, (count, amount))| DailyTrend {
                date,
                count,
                amount,
            })
            .collect();

        Self {
            total_count,
            total_hours,
            total_amount,
            total_commission: round_money(total_amount * commission_rate),
            average_price,
            status_distribution,
            daily_trend,
        }
    }
}
