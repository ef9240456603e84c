//! Document management handlers
//!
//! Thin JSON wrappers over the numbering and lifecycle persistence in
//! `crate::db::documents`. Domain errors surface verbatim: illegal
//! transitions map to 409, unknown documents to 404.

use agency_common::db::models::Document;
use agency_common::{DocumentStatus, DocumentType};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::documents::{self, DocumentFilter, NewDocument};
use crate::{ApiError, ApiResult, AppState};

const PAGE_SIZE: i64 = 50;

/// Header carrying the caller identity, set by the session layer
const USER_HEADER: &str = "x-agency-user";

/// POST /api/documents request body
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    /// Reference code: DEVIS, FACTURE, AVOIR or BDC
    pub doc_type: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub amount_ht: f64,
    pub amount_tax: f64,
    #[serde(default)]
    pub notes: String,
    pub collaboration_id: Option<String>,
}

/// POST /api/documents/:guid/cancel request body
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

/// GET /api/documents query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub doc_type: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// List response with pagination metadata
#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub documents: Vec<Document>,
}

fn caller(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn parse_doc_type(code: &str) -> Result<DocumentType, ApiError> {
    DocumentType::from_code(code)
        .map_err(|_| ApiError::BadRequest(format!("Unknown document type: {}", code)))
}

/// POST /api/documents
///
/// Creates a Draft document with a freshly issued sequential reference.
pub async fn create_document(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult<Json<Document>> {
    let doc_type = parse_doc_type(&request.doc_type)?;

    let document = documents::create_document(
        &state.db,
        NewDocument {
            doc_type,
            issue_date: request.issue_date,
            due_date: request.due_date,
            amount_ht: request.amount_ht,
            amount_tax: request.amount_tax,
            notes: request.notes,
            collaboration_id: request.collaboration_id,
            created_by: caller(&headers),
        },
    )
    .await?;

    Ok(Json(document))
}

/// GET /api/documents/:guid
pub async fn get_document(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Document>> {
    let document = documents::get_document(&state.db, &guid).await?;
    Ok(Json(document))
}

/// GET /api/documents?doc_type=FACTURE&status=draft&page=1
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<DocumentListResponse>> {
    let filter = DocumentFilter {
        doc_type: query.doc_type.as_deref().map(parse_doc_type).transpose()?,
        status: query
            .status
            .as_deref()
            .map(|s| {
                DocumentStatus::from_str_store(s)
                    .map_err(|_| ApiError::BadRequest(format!("Unknown status: {}", s)))
            })
            .transpose()?,
    };

    let page = query.page.max(1);
    let (total_rows, docs) = documents::list_documents(&state.db, &filter, page, PAGE_SIZE).await?;
    let total_pages = (total_rows + PAGE_SIZE - 1) / PAGE_SIZE;

    Ok(Json(DocumentListResponse {
        total_rows,
        page,
        page_size: PAGE_SIZE,
        total_pages,
        documents: docs,
    }))
}

/// POST /api/documents/:guid/register
pub async fn register_document(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Document>> {
    let document = documents::register_document(&state.db, &guid).await?;
    Ok(Json(document))
}

/// POST /api/documents/:guid/send
pub async fn send_document(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Document>> {
    let document = documents::send_document(&state.db, &guid).await?;
    Ok(Json(document))
}

/// POST /api/documents/:guid/pay
pub async fn pay_document(
    State(state): State<AppState>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Document>> {
    let document = documents::pay_document(&state.db, &guid).await?;
    Ok(Json(document))
}

/// POST /api/documents/:guid/cancel
pub async fn cancel_document(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(request): Json<CancelRequest>,
) -> ApiResult<Json<Document>> {
    let document = documents::cancel_document(&state.db, &guid, &request.reason).await?;
    Ok(Json(document))
}
