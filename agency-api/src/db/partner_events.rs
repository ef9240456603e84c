//! Partner press-kit interaction log
//!
//! Append-only: events are inserted by the public partner page and only
//! ever aggregated, never updated or deleted.

use agency_common::{time, Error, Period, Result};
use sqlx::SqlitePool;

/// Allowed interaction kinds
pub const EVENT_TYPES: [&str; 3] = ["view", "click", "download"];

/// Counts per interaction kind over a period
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct EventStats {
    pub views: i64,
    pub clicks: i64,
    pub downloads: i64,
}

/// Append a visitor interaction event
pub async fn record_event(
    pool: &SqlitePool,
    partner_guid: &str,
    event_type: &str,
    visitor: Option<&str>,
) -> Result<()> {
    if !EVENT_TYPES.contains(&event_type) {
        return Err(Error::InvalidInput(format!(
            "unknown event type: {} (expected view, click or download)",
            event_type
        )));
    }

    sqlx::query(
        "INSERT INTO partner_events (partner_guid, event_type, visitor, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(partner_guid)
    .bind(event_type)
    .bind(visitor)
    .bind(time::to_store(time::now()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Descriptive counts for a partner over the period
pub async fn event_stats(
    pool: &SqlitePool,
    partner_guid: &str,
    period: &Period,
) -> Result<EventStats> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT event_type, COUNT(*) FROM partner_events
         WHERE partner_guid = ?
           AND datetime(created_at) >= datetime(?)
           AND datetime(created_at) < datetime(?)
         GROUP BY event_type",
    )
    .bind(partner_guid)
    .bind(time::to_store(period.start))
    .bind(time::to_store(period.end))
    .fetch_all(pool)
    .await?;

    let mut stats = EventStats::default();
    for (event_type, count) in rows {
        match event_type.as_str() {
            "view" => stats.views = count,
            "click" => stats.clicks = count,
            "download" => stats.downloads = count,
            _ => {}
        }
    }

    Ok(stats)
}
