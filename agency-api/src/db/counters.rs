//! Sequential document numbering
//!
//! One counter row per (document type, year). The increment is a single
//! upsert statement so two concurrent document creations can never observe
//! the same sequence number or lose an increment; there is no read-then-write
//! window in application code. Counter rows are never deleted, and a number
//! is never reused even if the document that consumed it is later cancelled.

use agency_common::{DocumentType, Result};
use sqlx::SqlitePool;

/// Atomically issue the next sequence number for (doc_type, year)
///
/// Creates the counter row at 1 on first use, otherwise increments and
/// returns the new value. The store either advances the counter or fails;
/// there is no partial state.
pub async fn issue_number(pool: &SqlitePool, doc_type: DocumentType, year: i32) -> Result<i64> {
    let (value,): (i64,) = sqlx::query_as(
        "INSERT INTO document_counters (doc_type, year, last_value) VALUES (?, ?, 1)
         ON CONFLICT(doc_type, year) DO UPDATE SET last_value = last_value + 1
         RETURNING last_value",
    )
    .bind(doc_type.code())
    .bind(year)
    .fetch_one(pool)
    .await?;

    Ok(value)
}

/// Issue a number and format the document reference, e.g. `FACTURE-2026-0067`
pub async fn next_reference(
    pool: &SqlitePool,
    doc_type: DocumentType,
    year: i32,
) -> Result<String> {
    let sequence = issue_number(pool, doc_type, year).await?;
    Ok(doc_type.format_reference(year, sequence))
}

/// Administrative counter override
///
/// After reseeding to `value`, the next `issue_number` call returns
/// `value + 1`.
pub async fn reseed(
    pool: &SqlitePool,
    doc_type: DocumentType,
    year: i32,
    value: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO document_counters (doc_type, year, last_value) VALUES (?, ?, ?)
         ON CONFLICT(doc_type, year) DO UPDATE SET last_value = excluded.last_value",
    )
    .bind(doc_type.code())
    .bind(year)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Current counter value, 0 if the row does not exist yet
pub async fn current_value(pool: &SqlitePool, doc_type: DocumentType, year: i32) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT last_value FROM document_counters WHERE doc_type = ? AND year = ?",
    )
    .bind(doc_type.code())
    .bind(year)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(v,)| v).unwrap_or(0))
}
