//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up to
//! date with idempotent `CREATE TABLE IF NOT EXISTS` statements, so the
//! service starts against an empty root folder without any manual setup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Session pragmas: foreign keys, WAL for concurrent readers, busy timeout
async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;
    Ok(())
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_documents_table(pool).await?;
    create_document_counters_table(pool).await?;
    create_collaborations_table(pool).await?;
    create_negotiations_table(pool).await?;
    create_partner_events_table(pool).await?;
    Ok(())
}

async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            guid TEXT PRIMARY KEY,
            reference TEXT NOT NULL UNIQUE,
            doc_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            issue_date TEXT NOT NULL,
            due_date TEXT,
            amount_ht REAL NOT NULL DEFAULT 0,
            amount_tax REAL NOT NULL DEFAULT 0,
            amount_ttc REAL NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            collaboration_id TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_document_counters_table(pool: &SqlitePool) -> Result<()> {
    // One row per (doc_type, year); monotonic, never deleted
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS document_counters (
            doc_type TEXT NOT NULL,
            year INTEGER NOT NULL,
            last_value INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (doc_type, year)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_collaborations_table(pool: &SqlitePool) -> Result<()> {
    // Owned by the collaboration-management subsystem; read here for analytics
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collaborations (
            guid TEXT PRIMARY KEY,
            talent TEXT NOT NULL,
            brand TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            status TEXT NOT NULL,
            pole TEXT NOT NULL,
            amount_net REAL NOT NULL DEFAULT 0,
            signed_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_negotiations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS negotiations (
            guid TEXT PRIMARY KEY,
            brand TEXT NOT NULL,
            status TEXT NOT NULL,
            pole TEXT NOT NULL,
            amount_proposed REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_partner_events_table(pool: &SqlitePool) -> Result<()> {
    // Append-only press-kit interaction log
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS partner_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            partner_guid TEXT NOT NULL,
            event_type TEXT NOT NULL,
            visitor TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
