use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::interface::{AnalyticsError, Result};

// =============================================================================
// PERIODS
// =============================================================================

/// Half-open `[start, end)` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// The last `days` days ending at `now`, and the equally long window before it.
    pub fn trailing(now: DateTime<Utc>, days: i64) -> (Window, Window) {
        let start = now - Duration::days(days);
        let current = Window { start, end: now };
        let previous = Window {
            start: start - Duration::days(days),
            end: start,
        };
        (current, previous)
    }

    /// The calendar month as a UTC window. `None` for an invalid month.
    pub fn month(year: i32, month: u32) -> Option<Window> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Window {
            start: first.and_hms_opt(0, 0, 0)?.and_utc(),
            end: next.and_hms_opt(0, 0, 0)?.and_utc(),
        })
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    Window::month(year, month)
        .map(|w| (w.end - w.start).num_days() as u32)
        .unwrap_or(0)
}

// =============================================================================
// PERIOD-OVER-PERIOD CHANGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
    Same,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change<T> {
    pub change_type: ChangeType,
    pub difference: T,
}

/// Relative change in percent, rounded to two places. Growth from zero counts as 100%.
pub fn percentage_change(current: Decimal, previous: Decimal) -> Change<Decimal> {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Change {
                change_type: ChangeType::Increase,
                difference: Decimal::ONE_HUNDRED,
            }
        } else {
            Change {
                change_type: ChangeType::Same,
                difference: Decimal::ZERO,
            }
        };
    }

    let percent = (current - previous) / previous * Decimal::ONE_HUNDRED;
    let change_type = if percent > Decimal::ZERO {
        ChangeType::Increase
    } else if percent < Decimal::ZERO {
        ChangeType::Decrease
    } else {
        ChangeType::Same
    };
    Change {
        change_type,
        difference: percent
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    }
}

pub fn count_change(current: i64, previous: i64) -> Change<i64> {
    let change_type = if current > previous {
        ChangeType::Increase
    } else if current < previous {
        ChangeType::Decrease
    } else {
        ChangeType::Same
    };
    Change {
        change_type,
        difference: (current - previous).abs(),
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Serialize)]
pub struct IncomeStat {
    pub total: Decimal,
    #[serde(flatten)]
    pub change: Change<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ProductsStat {
    pub total: i64,
    pub this_month: i64,
    #[serde(flatten)]
    pub change: Change<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrdersStat {
    pub total: i64,
    pub this_year: i64,
    #[serde(flatten)]
    pub change: Change<i64>,
}

#[derive(Debug, Serialize)]
pub struct InProgressStat {
    pub total: i64,
    #[serde(flatten)]
    pub change: Change<i64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub total_income: IncomeStat,
    pub active_products: ProductsStat,
    pub orders_total: OrdersStat,
    pub orders_in_progress: InProgressStat,
}

// =============================================================================
// SALES BY DAY
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

/// Years accepted by the monthly sales report.
const REPORT_YEARS: std::ops::RangeInclusive<i32> = 2000..=2100;

impl SalesQuery {
    pub fn parse(&self) -> Result<(i32, u32)> {
        let month = self
            .month
            .as_deref()
            .and_then(|m| m.trim().parse::<u32>().ok())
            .filter(|m| (1..=12).contains(m))
            .ok_or(AnalyticsError::InvalidMonth)?;
        let year = self
            .year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .filter(|y| REPORT_YEARS.contains(y))
            .ok_or(AnalyticsError::InvalidYear)?;
        Ok((year, month))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: String,
    pub total_price: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SalesResponse {
    pub month: u32,
    pub year: i32,
    pub sales_data: Vec<DailySales>,
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub days_in_month: u32,
}

impl SalesResponse {
    /// One entry per calendar day; days without sales are zero-filled.
    pub fn new(year: i32, month: u32, rows: Vec<(NaiveDate, Decimal, i64)>) -> Self {
        let by_day: HashMap<u32, (Decimal, i64)> = rows
            .into_iter()
            .filter(|(date, _, _)| date.year() == year && date.month() == month)
            .map(|(date, total, count)| (date.day(), (total, count)))
            .collect();

        let days = days_in_month(year, month);
        let sales_data: Vec<DailySales> = (1..=days)
            .map(|day| {
                let (total_price, order_count) = by_day.get(&day).copied().unwrap_or((Decimal::ZERO, 0));
                DailySales {
                    date: format!("{year:04}-{month:02}-{day:02}"),
                    total_price,
                    order_count,
                }
            })
            .collect();

        Self {
            month,
            year,
            total_sales: sales_data.iter().map(|d| d.total_price).sum(),
            total_orders: sales_data.iter().map(|d| d.order_count).sum(),
            sales_data,
            days_in_month: days,
        }
    }
}
