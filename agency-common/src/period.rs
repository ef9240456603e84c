//! Reporting period helpers
//!
//! Periods are half-open `[start, end)` and always constructed from an
//! explicit reference instant so analytics stay deterministic under test.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Aggregation period with an optional business-unit (pole) filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Business-unit tag, e.g. "INFLUENCE" or "SALES"; `None` = all units
    pub pole: Option<String>,
}

impl Period {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, pole: Option<String>) -> Self {
        Period { start, end, pole }
    }

    /// `[first day of the current month 00:00, now)`
    pub fn current_month(now: DateTime<Utc>) -> Self {
        let start = month_start(now.year(), now.month());
        Period {
            start,
            end: now,
            pole: None,
        }
    }

    /// `[Jan 1 of the current year 00:00, now)`
    pub fn current_year(now: DateTime<Utc>) -> Self {
        let start = month_start(now.year(), 1);
        Period {
            start,
            end: now,
            pole: None,
        }
    }

    pub fn with_pole(mut self, pole: Option<String>) -> Self {
        self.pole = pole;
        self
    }
}

/// Midnight UTC on the first day of the given month
pub fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    // Valid by construction for month in 1..=12
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| panic!("invalid month: {}-{}", year, month));
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

/// Step a (year, month) pair backwards one calendar month
pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// The last `n` calendar months ending at `today`'s month, oldest first
pub fn last_n_months(today: DateTime<Utc>, n: u32) -> Vec<(i32, u32)> {
    let mut months = Vec::with_capacity(n as usize);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..n {
        months.push((year, month));
        let stepped = prev_month(year, month);
        year = stepped.0;
        month = stepped.1;
    }
    months.reverse();
    months
}

/// `YYYY-MM` bucket key matching SQLite's `strftime('%Y-%m', ...)`
pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}
