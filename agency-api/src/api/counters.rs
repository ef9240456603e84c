//! Administrative counter override handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use agency_common::DocumentType;

use crate::db::counters;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/counters/:doc_type/:year/reseed request body
#[derive(Debug, Deserialize)]
pub struct ReseedRequest {
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct ReseedResponse {
    pub doc_type: String,
    pub year: i32,
    pub last_value: i64,
}

/// POST /api/counters/:doc_type/:year/reseed
///
/// Sets the counter so the next issued number is `value + 1`. The counter
/// never moves backwards past issued references in practice; this endpoint
/// exists for administrative repair and initial migration.
pub async fn reseed_counter(
    State(state): State<AppState>,
    Path((doc_type, year)): Path<(String, i32)>,
    Json(request): Json<ReseedRequest>,
) -> ApiResult<Json<ReseedResponse>> {
    let doc_type = DocumentType::from_code(&doc_type)
        .map_err(|_| ApiError::BadRequest(format!("Unknown document type: {}", doc_type)))?;

    if request.value < 0 {
        return Err(ApiError::BadRequest(format!(
            "Counter value must be non-negative, got {}",
            request.value
        )));
    }

    counters::reseed(&state.db, doc_type, year, request.value).await?;

    // Report the stored counter value, not the request echo
    let last_value = counters::current_value(&state.db, doc_type, year).await?;

    Ok(Json(ReseedResponse {
        doc_type: doc_type.code().to_string(),
        year,
        last_value,
    }))
}
