//! Read queries over negotiations for conversion analytics

use agency_common::{time, Period, Result};
use sqlx::SqlitePool;

/// Total and won negotiation counts created in the period
pub async fn conversion_counts(pool: &SqlitePool, period: &Period) -> Result<(i64, i64)> {
    let row: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'won' THEN 1 ELSE 0 END), 0)
         FROM negotiations
         WHERE datetime(created_at) >= datetime(?)
           AND datetime(created_at) < datetime(?)
           AND (? IS NULL OR pole = ?)",
    )
    .bind(time::to_store(period.start))
    .bind(time::to_store(period.end))
    .bind(period.pole.as_deref())
    .bind(period.pole.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) async fn insert_negotiation(
        pool: &SqlitePool,
        guid: &str,
        status: &str,
        pole: &str,
        created_at: &str,
    ) {
        sqlx::query(
            "INSERT INTO negotiations (guid, brand, status, pole, amount_proposed, created_at)
             VALUES (?, 'brand-1', ?, ?, 0, ?)",
        )
        .bind(guid)
        .bind(status)
        .bind(pole)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        agency_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_counts_total_and_won_in_period() {
        let pool = setup_test_db().await;
        insert_negotiation(&pool, "n1", "won", "SALES", "2026-03-02T10:00:00Z").await;
        insert_negotiation(&pool, "n2", "lost", "SALES", "2026-03-03T10:00:00Z").await;
        insert_negotiation(&pool, "n3", "pending", "SALES", "2026-03-04T10:00:00Z").await;
        // Outside the period
        insert_negotiation(&pool, "n4", "won", "SALES", "2026-04-02T10:00:00Z").await;

        let period = Period::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            None,
        );
        let (total, won) = conversion_counts(&pool, &period).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(won, 1);
    }

    #[tokio::test]
    async fn test_pole_filter() {
        let pool = setup_test_db().await;
        insert_negotiation(&pool, "n1", "won", "INFLUENCE", "2026-03-02T10:00:00Z").await;
        insert_negotiation(&pool, "n2", "won", "SALES", "2026-03-03T10:00:00Z").await;

        let period = Period::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            Some("INFLUENCE".to_string()),
        );
        let (total, won) = conversion_counts(&pool, &period).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(won, 1);
    }
}
