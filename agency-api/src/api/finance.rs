//! Finance analytics handlers
//!
//! Callers supply a half-open period as `date_debut` / `date_fin` query
//! parameters (both or neither); when omitted the current month is used.

use agency_common::{time, Period};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::finance::{self, Conversion, FinanceStats, MonthRevenue};
use crate::{ApiError, ApiResult, AppState};

/// Period query parameters shared by stats and conversion
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
    pub pole: Option<String>,
}

/// GET /api/finance/evolution query parameters
#[derive(Debug, Deserialize)]
pub struct EvolutionQuery {
    #[serde(default = "default_months")]
    pub months: u32,
    pub pole: Option<String>,
}

fn default_months() -> u32 {
    6
}

fn resolve_period(query: PeriodQuery) -> Result<Period, ApiError> {
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
        (None, None) => Period::current_month(time::now()),
        _ => {
            return Err(ApiError::BadRequest(
                "date_debut and date_fin must be supplied together".to_string(),
            ))
        }
    };

    Ok(period.with_pole(query.pole))
}

/// GET /api/finance/stats?date_debut=2026-01-01&date_fin=2026-02-01&pole=INFLUENCE
pub async fn finance_stats(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<FinanceStats>> {
    let period = resolve_period(query)?;
    let stats = finance::compute_stats(&state.db, &period).await?;
    Ok(Json(stats))
}

/// GET /api/finance/conversion?date_debut=...&date_fin=...[&pole=...]
pub async fn finance_conversion(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Conversion>> {
    let period = resolve_period(query)?;
    let conversion = finance::compute_conversion(&state.db, &period).await?;
    Ok(Json(conversion))
}

/// GET /api/finance/evolution?months=6[&pole=...]
pub async fn finance_evolution(
    State(state): State<AppState>,
    Query(query): Query<EvolutionQuery>,
) -> ApiResult<Json<Vec<MonthRevenue>>> {
    if query.months == 0 || query.months > 60 {
        return Err(ApiError::BadRequest(format!(
            "months must be between 1 and 60, got {}",
            query.months
        )));
    }

    let evolution =
        finance::compute_evolution(&state.db, query.months, query.pole.as_deref(), time::now())
            .await?;
    Ok(Json(evolution))
}

/// GET /api/finance/forecast
pub async fn finance_forecast(
    State(state): State<AppState>,
) -> ApiResult<Json<serde_json::Value>> {
    let projected = finance::compute_forecast(&state.db, time::now()).await?;
    Ok(Json(serde_json::json!({ "projected_revenue": projected })))
}
