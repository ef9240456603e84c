//! Document creation and lifecycle persistence
//!
//! Creation issues the reference through the atomic counter (one request,
//! one number). Status transitions load the current row, apply the pure
//! state machine from agency-common, then persist with a conditional update
//! keyed on the old status so a concurrent transition on the same document
//! cannot be silently overwritten.

use agency_common::db::models::Document;
use agency_common::{time, DocumentStatus, DocumentType, Error, Result};
use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::counters;

const DOCUMENT_COLUMNS: &str = "guid, reference, doc_type, status, issue_date, due_date, \
     amount_ht, amount_tax, amount_ttc, notes, collaboration_id, created_by, created_at, updated_at";

type DocumentRow = (
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    f64,
    f64,
    f64,
    String,
    Option<String>,
    String,
    String,
    String,
);

fn row_to_document(row: DocumentRow) -> Document {
    Document {
        guid: row.0,
        reference: row.1,
        doc_type: row.2,
        status: row.3,
        issue_date: row.4,
        due_date: row.5,
        amount_ht: row.6,
        amount_tax: row.7,
        amount_ttc: row.8,
        notes: row.9,
        collaboration_id: row.10,
        created_by: row.11,
        created_at: row.12,
        updated_at: row.13,
    }
}

/// Fields supplied by the caller when creating a document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub doc_type: DocumentType,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub amount_ht: f64,
    pub amount_tax: f64,
    pub notes: String,
    pub collaboration_id: Option<String>,
    pub created_by: String,
}

/// Create a document in Draft status with a freshly issued reference
pub async fn create_document(pool: &SqlitePool, new: NewDocument) -> Result<Document> {
    if !new.amount_ht.is_finite() || new.amount_ht < 0.0 {
        return Err(Error::InvalidInput(format!(
            "amount_ht must be a non-negative number, got {}",
            new.amount_ht
        )));
    }
    if !new.amount_tax.is_finite() || new.amount_tax < 0.0 {
        return Err(Error::InvalidInput(format!(
            "amount_tax must be a non-negative number, got {}",
            new.amount_tax
        )));
    }

    let year = new.issue_date.year();
    let reference = counters::next_reference(pool, new.doc_type, year).await?;

    let guid = Uuid::new_v4().to_string();
    let now = time::to_store(time::now());
    let amount_ttc = new.amount_ht + new.amount_tax;

    sqlx::query(
        "INSERT INTO documents
         (guid, reference, doc_type, status, issue_date, due_date,
          amount_ht, amount_tax, amount_ttc, notes, collaboration_id,
          created_by, created_at, updated_at)
         VALUES (?, ?, ?, 'draft', ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&guid)
    .bind(&reference)
    .bind(new.doc_type.code())
    .bind(new.issue_date.to_string())
    .bind(new.due_date.map(|d| d.to_string()))
    .bind(new.amount_ht)
    .bind(new.amount_tax)
    .bind(amount_ttc)
    .bind(&new.notes)
    .bind(&new.collaboration_id)
    .bind(&new.created_by)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    get_document(pool, &guid).await
}

/// Load a document by guid
pub async fn get_document(pool: &SqlitePool, guid: &str) -> Result<Document> {
    let sql = format!("SELECT {} FROM documents WHERE guid = ?", DOCUMENT_COLUMNS);
    let row: Option<DocumentRow> = sqlx::query_as(&sql).bind(guid).fetch_optional(pool).await?;

    row.map(row_to_document)
        .ok_or_else(|| Error::NotFound(format!("document {}", guid)))
}

/// Optional list filters
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub doc_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
}

/// Page of documents, newest first
pub async fn list_documents(
    pool: &SqlitePool,
    filter: &DocumentFilter,
    page: i64,
    page_size: i64,
) -> Result<(i64, Vec<Document>)> {
    let doc_type = filter.doc_type.map(|t| t.code());
    let status = filter.status.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM documents
         WHERE (? IS NULL OR doc_type = ?) AND (? IS NULL OR status = ?)",
    )
    .bind(doc_type)
    .bind(doc_type)
    .bind(status)
    .bind(status)
    .fetch_one(pool)
    .await?;

    let offset = (page.max(1) - 1) * page_size;
    let sql = format!(
        "SELECT {} FROM documents
         WHERE (? IS NULL OR doc_type = ?) AND (? IS NULL OR status = ?)
         ORDER BY created_at DESC
         LIMIT ? OFFSET ?",
        DOCUMENT_COLUMNS
    );
    let rows: Vec<DocumentRow> = sqlx::query_as(&sql)
        .bind(doc_type)
        .bind(doc_type)
        .bind(status)
        .bind(status)
        .bind(page_size)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((total, rows.into_iter().map(row_to_document).collect()))
}

/// Register (validate) a draft document
pub async fn register_document(pool: &SqlitePool, guid: &str) -> Result<Document> {
    apply_transition(pool, guid, DocumentStatus::register, None).await
}

/// Mark a draft document as sent
pub async fn send_document(pool: &SqlitePool, guid: &str) -> Result<Document> {
    apply_transition(pool, guid, DocumentStatus::send, None).await
}

/// Mark a registered document as paid
pub async fn pay_document(pool: &SqlitePool, guid: &str) -> Result<Document> {
    apply_transition(pool, guid, DocumentStatus::pay, None).await
}

/// Cancel a document with a mandatory reason, appended to its notes with
/// a UTC timestamp
pub async fn cancel_document(pool: &SqlitePool, guid: &str, reason: &str) -> Result<Document> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Error::InvalidInput(
            "a cancellation reason is required".to_string(),
        ));
    }

    let note = format!("[{}] cancelled: {}", time::to_store(time::now()), reason);
    apply_transition(pool, guid, DocumentStatus::cancel, Some(note)).await
}

/// Load current status, run the pure transition, persist conditionally.
///
/// The UPDATE is keyed on the old status; zero affected rows means another
/// request transitioned the document between our read and write, which is
/// reported as a transition conflict rather than overwritten.
async fn apply_transition(
    pool: &SqlitePool,
    guid: &str,
    transition: fn(DocumentStatus) -> Result<DocumentStatus>,
    appended_note: Option<String>,
) -> Result<Document> {
    let current = get_document(pool, guid).await?;
    let old_status = DocumentStatus::from_str_store(&current.status)?;
    let new_status = transition(old_status)?;

    let notes = match appended_note {
        Some(note) if current.notes.is_empty() => note,
        Some(note) => format!("{}\n{}", current.notes, note),
        None => current.notes.clone(),
    };

    let result = sqlx::query(
        "UPDATE documents SET status = ?, notes = ?, updated_at = ?
         WHERE guid = ? AND status = ?",
    )
    .bind(new_status.as_str())
    .bind(&notes)
    .bind(time::to_store(time::now()))
    .bind(guid)
    .bind(old_status.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::InvalidTransition(format!(
            "document {} was modified concurrently, transition not applied",
            guid
        )));
    }

    get_document(pool, guid).await
}
