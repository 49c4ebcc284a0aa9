//! Route definitions for the Shipgate HTTP API.
//!
//! All routes are mounted under `/api`. External agents reach only the
//! `/portal` routes; everything else requires a staff token.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use axum::routing::{get, patch, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(portal_routes())
        .merge(grant_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// External portal: the credential's own shipment
fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/portal/session", get(handlers::portal::session))
        .route("/portal/shipment", get(handlers::portal::get_shipment))
        .route(
            "/portal/shipment/fields",
            patch(handlers::portal::update_fields),
        )
        .route(
            "/portal/shipment/status",
            post(handlers::portal::change_status),
        )
        .route(
            "/portal/shipment/documents",
            post(handlers::portal::add_document),
        )
        .route("/portal/shipment/notes", post(handlers::portal::add_note))
        .route("/portal/shipment/audit", get(handlers::portal::audit_trail))
}

/// Staff grant management and audit
fn grant_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shipments/{id}/grants",
            get(handlers::grant::list_grants).post(handlers::grant::create_grant),
        )
        .route(
            "/shipments/{id}/audit",
            get(handlers::audit::shipment_audit),
        )
        .route("/grants/{id}/revoke", post(handlers::grant::revoke_grant))
        .route("/grants/{id}/rotate", post(handlers::grant::rotate_grant))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
