//! Capability guard middleware
//!
//! The session provider in front of this service resolves the caller and
//! forwards the role in the `X-Agency-Role` header. Each route group is
//! wrapped in a guard that checks the central role-to-capability table;
//! handlers themselves never inspect roles.

use agency_common::{Capability, Role};
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Header carrying the caller role, set by the session layer
pub const ROLE_HEADER: &str = "x-agency-role";

async fn require(request: Request, next: Next, capability: Capability) -> Result<Response, AuthError> {
    let value = request
        .headers()
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingRole)?;

    let role = Role::from_header(value).ok_or_else(|| AuthError::UnknownRole(value.to_string()))?;

    if !role.allows(capability) {
        return Err(AuthError::Forbidden(role));
    }

    Ok(next.run(request).await)
}

/// Guard for document management routes
pub async fn documents_guard(request: Request, next: Next) -> Result<Response, AuthError> {
    require(request, next, Capability::ManageDocuments).await
}

/// Guard for the administrative counter override
pub async fn counters_guard(request: Request, next: Next) -> Result<Response, AuthError> {
    require(request, next, Capability::ReseedCounters).await
}

/// Guard for financial analytics routes
pub async fn finance_guard(request: Request, next: Next) -> Result<Response, AuthError> {
    require(request, next, Capability::ViewFinance).await
}

/// Guard for partner tracking reports
pub async fn tracking_guard(request: Request, next: Next) -> Result<Response, AuthError> {
    require(request, next, Capability::ViewTracking).await
}

/// Authorization error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingRole,
    UnknownRole(String),
    Forbidden(Role),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingRole => (
                StatusCode::UNAUTHORIZED,
                "Missing role header".to_string(),
            ),
            AuthError::UnknownRole(value) => (
                StatusCode::UNAUTHORIZED,
                format!("Unknown role: {}", value),
            ),
            AuthError::Forbidden(role) => (
                StatusCode::FORBIDDEN,
                format!("Role {:?} is not allowed to perform this operation", role),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
