//! Audit logging middleware.
//!
//! Logs every API request with method, path, status, and the customer
//! when one is authenticated. Runs innermost (after auth has injected
//! `CustomerContext`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::CustomerContext;

/// Log API access for the audit trail.
pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let med_id = req
        .extensions()
        .get::<CustomerContext>()
        .map(|c| c.med_id.clone());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    match med_id {
        Some(med_id) => tracing::info!(%method, %path, status, %med_id, "API access"),
        None => tracing::info!(%method, %path, status, "API access"),
    }

    response
}
