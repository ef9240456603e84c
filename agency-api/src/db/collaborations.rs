//! Read queries over collaborations for the analytics aggregator
//!
//! Collaborations are written by the collaboration-management subsystem;
//! this service only aggregates them. All period filters are half-open
//! `[start, end)` and use SQLite `datetime()` normalization so date-only
//! and RFC 3339 values compare correctly.

use agency_common::{time, Period, Result};
use sqlx::SqlitePool;

/// Statuses whose net amount counts as recognized revenue
pub const REVENUE_STATUSES: &str = "('won', 'in_progress', 'published')";

/// Sum and count of recognized revenue in the period
pub async fn revenue_in_period(pool: &SqlitePool, period: &Period) -> Result<(f64, i64)> {
    let sql = format!(
        "SELECT COALESCE(SUM(amount_net), 0.0), COUNT(*) FROM collaborations
         WHERE status IN {}
           AND datetime(signed_date) >= datetime(?)
           AND datetime(signed_date) < datetime(?)
           AND (? IS NULL OR pole = ?)",
        REVENUE_STATUSES
    );

    let row: (f64, i64) = sqlx::query_as(&sql)
        .bind(time::to_store(period.start))
        .bind(time::to_store(period.end))
        .bind(period.pole.as_deref())
        .bind(period.pole.as_deref())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Collaboration count per status over the period (all statuses)
pub async fn count_by_status(pool: &SqlitePool, period: &Period) -> Result<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT status, COUNT(*) FROM collaborations
         WHERE datetime(signed_date) >= datetime(?)
           AND datetime(signed_date) < datetime(?)
           AND (? IS NULL OR pole = ?)
         GROUP BY status
         ORDER BY status",
    )
    .bind(time::to_store(period.start))
    .bind(time::to_store(period.end))
    .bind(period.pole.as_deref())
    .bind(period.pole.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Recognized revenue grouped by `YYYY-MM` month of the signing date,
/// starting at `from` (RFC 3339). Months without data are absent; the
/// caller zero-fills.
pub async fn monthly_revenue(
    pool: &SqlitePool,
    from: &str,
    pole: Option<&str>,
) -> Result<Vec<(String, f64)>> {
    let sql = format!(
        "SELECT strftime('%Y-%m', signed_date) AS month, COALESCE(SUM(amount_net), 0.0)
         FROM collaborations
         WHERE status IN {}
           AND datetime(signed_date) >= datetime(?)
           AND (? IS NULL OR pole = ?)
         GROUP BY month
         ORDER BY month",
        REVENUE_STATUSES
    );

    let rows: Vec<(String, f64)> = sqlx::query_as(&sql)
        .bind(from)
        .bind(pole)
        .bind(pole)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
