//! agency-api library - HTTP service for the agency management backend
//!
//! Owns the document numbering / lifecycle operations, the finance
//! analytics aggregator and the partner press-kit tracking log, exposed
//! as thin JSON handlers over a shared SQLite pool.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod error;
pub mod finance;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Handler groups are guarded by capability middleware; the health
/// endpoint and the public tracking ingest take no role header.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Document management (Manager or Admin)
    let documents = Router::new()
        .route("/api/documents", post(api::create_document).get(api::list_documents))
        .route("/api/documents/:guid", get(api::get_document))
        .route("/api/documents/:guid/register", post(api::register_document))
        .route("/api/documents/:guid/send", post(api::send_document))
        .route("/api/documents/:guid/pay", post(api::pay_document))
        .route("/api/documents/:guid/cancel", post(api::cancel_document))
        .layer(middleware::from_fn(api::auth::documents_guard));

    // Administrative counter override (Admin only)
    let counters = Router::new()
        .route("/api/counters/:doc_type/:year/reseed", post(api::reseed_counter))
        .layer(middleware::from_fn(api::auth::counters_guard));

    // Financial analytics (Admin only)
    let finance = Router::new()
        .route("/api/finance/stats", get(api::finance_stats))
        .route("/api/finance/conversion", get(api::finance_conversion))
        .route("/api/finance/evolution", get(api::finance_evolution))
        .route("/api/finance/forecast", get(api::finance_forecast))
        .layer(middleware::from_fn(api::auth::finance_guard));

    // Partner press-kit reports (Manager or Admin)
    let tracking = Router::new()
        .route("/api/partners/:guid/stats", get(api::partner_stats))
        .layer(middleware::from_fn(api::auth::tracking_guard));

    // Public routes: health check and anonymous visitor event ingest
    let public = Router::new()
        .route("/api/partners/:guid/track", post(api::track_partner_event))
        .merge(api::health_routes());

    Router::new()
        .merge(documents)
        .merge(counters)
        .merge(finance)
        .merge(tracking)
        .merge(public)
        .with_state(state)
}
