//! Partner press-kit tracking handlers
//!
//! Event ingest is public (driven by anonymous visitors of the partner
//! page); the report endpoint is guarded.

use agency_common::{time, Period};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::db::partner_events::{self, EventStats};
use crate::{ApiError, ApiResult, AppState};

/// POST /api/partners/:guid/track request body
#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    /// One of: view, click, download
    pub event_type: String,
    pub visitor: Option<String>,
}

/// GET /api/partners/:guid/stats query parameters
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
}

/// POST /api/partners/:guid/track
pub async fn track_partner_event(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Json(request): Json<TrackRequest>,
) -> ApiResult<StatusCode> {
    partner_events::record_event(
        &state.db,
        &guid,
        &request.event_type,
        request.visitor.as_deref(),
    )
    .await?;

    Ok(StatusCode::CREATED)
}

/// GET /api/partners/:guid/stats
///
/// Defaults to the current year when no period is supplied.
pub async fn partner_stats(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<EventStats>> {
    let period = match (query.date_debut, query.date_fin) {
        (Some(debut), Some(fin)) => {
            if fin <= debut {
                return Err(ApiError::BadRequest(format!(
                    "date_fin ({}) must be after date_debut ({})",
                    fin, debut
                )));
            }
            Period::new(
                Utc.from_utc_datetime(&debut.and_hms_opt(0, 0, 0).unwrap()),
                Utc.from_utc_datetime(&fin.and_hms_opt(0, 0, 0).unwrap()),
                None,
            )
        }
        (None, None) => Period::current_year(time::now()),
        _ => {
            return Err(ApiError::BadRequest(
                "date_debut and date_fin must be supplied together".to_string(),
            ))
        }
    };

    let stats = partner_events::event_stats(&state.db, &guid, &period).await?;
    Ok(Json(stats))
}
