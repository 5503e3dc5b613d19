//! Portal API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS + response headers → 2. Auth validator → 3. Audit logger

use axum::http::header::{HeaderValue, X_CONTENT_TYPE_OPTIONS};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the portal API router over an existing context.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn portal_api_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/customer/logout", post(endpoints::auth::logout))
        .route(
            "/customer/profile",
            get(endpoints::profile::get).patch(endpoints::profile::update),
        )
        .route("/customer/medications", post(endpoints::medications::add))
        .route(
            "/customer/medications/:index",
            delete(endpoints::medications::remove),
        )
        .route("/customer/reports", post(endpoints::reports::add))
        .route("/customer/reports/:index", delete(endpoints::reports::remove))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes (audit only)
    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/customer/register", post(endpoints::auth::register))
        .route("/auth/customer/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(CorsLayer::permissive())
}
