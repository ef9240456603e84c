//! Integration tests for agency-api endpoints
//!
//! Covers document creation and lifecycle, counter reseeding, finance
//! analytics, partner tracking and the capability guards, driving the
//! full router with in-memory databases.

use agency_api::{build_router, AppState};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: in-memory database with the production schema
///
/// Single connection so every query in the test sees the same database.
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Should open in-memory database");
    agency_common::db::create_schema(&pool)
        .await
        .expect("Should create schema");
    pool
}

fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db))
}

/// Test helper: request with optional role header and JSON body
fn test_request(method: &str, uri: &str, role: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("x-agency-role", role);
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn create_invoice_body(amount_ht: f64) -> Value {
    json!({
        "doc_type": "FACTURE",
        "issue_date": "2026-03-15",
        "due_date": "2026-04-15",
        "amount_ht": amount_ht,
        "amount_tax": amount_ht * 0.2,
    })
}

async fn create_invoice(app: &axum::Router, amount_ht: f64) -> Value {
    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            "/api/documents",
            Some("manager"),
            Some(create_invoice_body(amount_ht)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

async fn seed_collaboration(pool: &SqlitePool, guid: &str, status: &str, pole: &str, amount: f64, signed: &str) {
    sqlx::query(
        "INSERT INTO collaborations
         (guid, talent, brand, title, status, pole, amount_net, signed_date, created_at)
         VALUES (?, 't', 'b', '', ?, ?, ?, ?, ?)",
    )
    .bind(guid)
    .bind(status)
    .bind(pole)
    .bind(amount)
    .bind(signed)
    .bind(format!("{}T00:00:00Z", signed))
    .execute(pool)
    .await
    .unwrap();
}

// =============================================================================
// Health endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "agency-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Capability guards
// =============================================================================

#[tokio::test]
async fn test_missing_role_header_is_unauthorized() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "POST",
            "/api/documents",
            None,
            Some(create_invoice_body(100.0)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_insufficient_capability_is_forbidden() {
    let app = setup_app(setup_test_db().await);

    // Partner cannot manage documents
    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            "/api/documents",
            Some("partner"),
            Some(create_invoice_body(100.0)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Manager cannot view finance or reseed counters
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/finance/forecast", Some("manager"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(test_request(
            "POST",
            "/api/counters/FACTURE/2026/reseed",
            Some("manager"),
            Some(json!({ "value": 10 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/api/finance/stats", Some("intern"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Documents: creation and numbering
// =============================================================================

#[tokio::test]
async fn test_create_document_assigns_reference() {
    let app = setup_app(setup_test_db().await);

    let doc = create_invoice(&app, 1000.0).await;
    assert_eq!(doc["reference"], "FACTURE-2026-0001");
    assert_eq!(doc["status"], "draft");
    assert_eq!(doc["amount_ttc"], 1200.0);

    let doc = create_invoice(&app, 500.0).await;
    assert_eq!(doc["reference"], "FACTURE-2026-0002");
}

#[tokio::test]
async fn test_create_document_unknown_type_is_bad_request() {
    let app = setup_app(setup_test_db().await);

    let mut body = create_invoice_body(100.0);
    body["doc_type"] = json!("RECU");
    let response = app
        .oneshot(test_request("POST", "/api/documents", Some("manager"), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reseed_then_create_uses_reseeded_sequence() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            "/api/counters/FACTURE/2026/reseed",
            Some("admin"),
            Some(json!({ "value": 66 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The response reports the counter value as stored
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["doc_type"], "FACTURE");
    assert_eq!(body["year"], 2026);
    assert_eq!(body["last_value"], 66);

    let doc = create_invoice(&app, 100.0).await;
    assert_eq!(doc["reference"], "FACTURE-2026-0067");
}

// =============================================================================
// Documents: lifecycle
// =============================================================================

#[tokio::test]
async fn test_register_succeeds_once_then_conflicts() {
    let app = setup_app(setup_test_db().await);
    let doc = create_invoice(&app, 100.0).await;
    let guid = doc["guid"].as_str().unwrap();

    let uri = format!("/api/documents/{}/register", guid);
    let response = app
        .clone()
        .oneshot(test_request("POST", &uri, Some("manager"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "registered");

    let response = app
        .oneshot(test_request("POST", &uri, Some("manager"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("only a draft can be registered"));
}

#[tokio::test]
async fn test_paid_document_cannot_be_cancelled() {
    let app = setup_app(setup_test_db().await);
    let doc = create_invoice(&app, 100.0).await;
    let guid = doc["guid"].as_str().unwrap();

    for action in ["register", "pay"] {
        let uri = format!("/api/documents/{}/{}", guid, action);
        let response = app
            .clone()
            .oneshot(test_request("POST", &uri, Some("manager"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let uri = format!("/api/documents/{}/cancel", guid);
    let response = app
        .oneshot(test_request(
            "POST",
            &uri,
            Some("manager"),
            Some(json!({ "reason": "too late" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("credit note"));
}

#[tokio::test]
async fn test_cancel_requires_reason() {
    let app = setup_app(setup_test_db().await);
    let doc = create_invoice(&app, 100.0).await;
    let guid = doc["guid"].as_str().unwrap();

    let uri = format!("/api/documents/{}/cancel", guid);
    let response = app
        .clone()
        .oneshot(test_request(
            "POST",
            &uri,
            Some("manager"),
            Some(json!({ "reason": "  " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A valid cancellation appends the reason to the notes
    let response = app
        .oneshot(test_request(
            "POST",
            &uri,
            Some("manager"),
            Some(json!({ "reason": "client withdrew" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "cancelled");
    assert!(body["notes"]
        .as_str()
        .unwrap()
        .contains("cancelled: client withdrew"));
}

#[tokio::test]
async fn test_get_unknown_document_is_not_found() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/documents/no-such-guid",
            Some("manager"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_documents_pagination_metadata() {
    let app = setup_app(setup_test_db().await);
    for _ in 0..3 {
        create_invoice(&app, 100.0).await;
    }

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/documents?doc_type=FACTURE",
            Some("manager"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["documents"].as_array().unwrap().len(), 3);
}

// =============================================================================
// Finance analytics
// =============================================================================

#[tokio::test]
async fn test_finance_stats_totals() {
    let pool = setup_test_db().await;
    seed_collaboration(&pool, "c1", "won", "SALES", 100.0, "2026-03-05").await;
    seed_collaboration(&pool, "c2", "won", "SALES", 200.0, "2026-03-10").await;
    seed_collaboration(&pool, "c3", "published", "SALES", 300.0, "2026-03-20").await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/stats?date_debut=2026-03-01&date_fin=2026-04-01",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_revenue"], 600.0);
    assert_eq!(body["count"], 3);
    assert_eq!(body["average_deal"], 200.0);
}

#[tokio::test]
async fn test_finance_stats_unmatched_pole_is_zero() {
    let pool = setup_test_db().await;
    seed_collaboration(&pool, "c1", "won", "INFLUENCE", 100.0, "2026-03-05").await;
    let app = setup_app(pool);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/stats?date_debut=2026-03-01&date_fin=2026-04-01&pole=IMMOBILIER",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_revenue"], 0.0);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_finance_partial_period_is_bad_request() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/stats?date_debut=2026-03-01",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_conversion_with_no_negotiations_is_zero() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/conversion?date_debut=2026-03-01&date_fin=2026-04-01",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["won"], 0);
    assert_eq!(body["rate"], 0.0);
}

#[tokio::test]
async fn test_evolution_returns_exactly_n_months() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/evolution?months=6",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 6);

    // Chronological order, zero revenue for empty months
    let months: Vec<&str> = entries.iter().map(|e| e["month"].as_str().unwrap()).collect();
    let mut sorted = months.clone();
    sorted.sort();
    assert_eq!(months, sorted);
    assert!(entries.iter().all(|e| e["revenue"] == 0.0));
}

#[tokio::test]
async fn test_evolution_rejects_zero_months() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/finance/evolution?months=0",
            Some("admin"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_on_empty_database_is_zero() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/api/finance/forecast", Some("admin"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["projected_revenue"], 0.0);
}

// =============================================================================
// Partner tracking
// =============================================================================

#[tokio::test]
async fn test_track_event_is_public_and_stats_are_guarded() {
    let app = setup_app(setup_test_db().await);

    // Anonymous visitors can record events
    for event_type in ["view", "view", "download"] {
        let response = app
            .clone()
            .oneshot(test_request(
                "POST",
                "/api/partners/p1/track",
                None,
                Some(json!({ "event_type": event_type })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Reports require a role with the tracking capability
    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/partners/p1/stats", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/partners/p1/stats?date_debut=2020-01-01&date_fin=2036-01-01",
            Some("manager"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["views"], 2);
    assert_eq!(body["clicks"], 0);
    assert_eq!(body["downloads"], 1);
}

#[tokio::test]
async fn test_track_unknown_event_type_is_bad_request() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "POST",
            "/api/partners/p1/track",
            None,
            Some(json!({ "event_type": "hover" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
