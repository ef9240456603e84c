//! Finance analytics aggregator
//!
//! Single-pass rollups over stored collaborations and negotiations:
//! revenue totals, negotiation conversion rate, monthly revenue evolution
//! and a linear-trend forecast. Every entry point takes an explicit period
//! or reference date so results are deterministic under test.

use agency_common::{period, Period, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::{collaborations, negotiations};

/// Months of history feeding the forecast
const FORECAST_WINDOW_MONTHS: u32 = 6;

/// Revenue rollup over a period
#[derive(Debug, Clone, Serialize)]
pub struct FinanceStats {
    /// Sum of net amounts for revenue-recognized collaborations
    pub total_revenue: f64,
    /// Number of revenue-recognized collaborations
    pub count: i64,
    /// Average deal size, 0 when there are no deals
    pub average_deal: f64,
    /// Collaboration count per status (all statuses in period)
    pub count_by_status: BTreeMap<String, i64>,
}

/// Negotiation conversion over a period
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub total: i64,
    pub won: i64,
    /// Percentage with 2-decimal rounding; 0 when total = 0
    pub rate: f64,
}

/// One calendar-month revenue bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: f64,
}

/// Round to 2 decimal places (monetary display precision)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Revenue totals, deal count, average deal size and per-status counts
pub async fn compute_stats(pool: &SqlitePool, period: &Period) -> Result<FinanceStats> {
    let (total_revenue, count) = collaborations::revenue_in_period(pool, period).await?;
    let count_by_status: BTreeMap<String, i64> = collaborations::count_by_status(pool, period)
        .await?
        .into_iter()
        .collect();

    let average_deal = if count == 0 {
        0.0
    } else {
        round2(total_revenue / count as f64)
    };

    Ok(FinanceStats {
        total_revenue: round2(total_revenue),
        count,
        average_deal,
        count_by_status,
    })
}

/// Conversion rate = won negotiations / all negotiations created in period
pub async fn compute_conversion(pool: &SqlitePool, period: &Period) -> Result<Conversion> {
    let (total, won) = negotiations::conversion_counts(pool, period).await?;

    // Zero-denominator case: an empty period converts at 0, not NaN
    let rate = if total == 0 {
        0.0
    } else {
        round2(won as f64 / total as f64 * 100.0)
    };

    Ok(Conversion { total, won, rate })
}

/// Exactly `nb_months` consecutive month buckets ending at `today`'s month,
/// oldest first; months without collaborations report revenue = 0
pub async fn compute_evolution(
    pool: &SqlitePool,
    nb_months: u32,
    pole: Option<&str>,
    today: DateTime<Utc>,
) -> Result<Vec<MonthRevenue>> {
    let months = period::last_n_months(today, nb_months);
    let Some(&(from_year, from_month)) = months.first() else {
        return Ok(Vec::new());
    };

    let from = agency_common::time::to_store(period::month_start(from_year, from_month));
    let by_month: BTreeMap<String, f64> = collaborations::monthly_revenue(pool, &from, pole)
        .await?
        .into_iter()
        .collect();

    Ok(months
        .into_iter()
        .map(|(year, month)| {
            let key = period::month_key(year, month);
            let revenue = round2(by_month.get(&key).copied().unwrap_or(0.0));
            MonthRevenue {
                month: key,
                revenue,
            }
        })
        .collect())
}

/// Projected revenue for the month after `today`'s month
///
/// Least-squares linear trend over the months of the forecast window that
/// actually contain data, projected one month past the window. Returns 0
/// (never an error) when fewer than 2 months of history exist, and is
/// clamped so a falling trend never projects negative revenue.
pub async fn compute_forecast(pool: &SqlitePool, today: DateTime<Utc>) -> Result<f64> {
    let months = period::last_n_months(today, FORECAST_WINDOW_MONTHS);
    let Some(&(from_year, from_month)) = months.first() else {
        return Ok(0.0);
    };

    let from = agency_common::time::to_store(period::month_start(from_year, from_month));
    let rows: BTreeMap<String, f64> = collaborations::monthly_revenue(pool, &from, None)
        .await?
        .into_iter()
        .collect();

    // Only months inside the window, indexed by their position in it
    let points: Vec<(f64, f64)> = months
        .iter()
        .enumerate()
        .filter_map(|(idx, &(year, month))| {
            rows.get(&period::month_key(year, month))
                .map(|&revenue| (idx as f64, revenue))
        })
        .collect();

    if points.len() < 2 {
        return Ok(0.0);
    }

    let projected = linear_extrapolate(&points, FORECAST_WINDOW_MONTHS as f64);
    Ok(round2(projected.max(0.0)))
}

/// Least-squares fit over (x, y) points, evaluated at `x`
///
/// Callers guarantee at least 2 points with distinct x values.
fn linear_extrapolate(points: &[(f64, f64)], x: f64) -> f64 {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return sum_y / n;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    slope * x + intercept
}
