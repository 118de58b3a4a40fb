//! HTTP route handlers for the locator.
//!
//! # Route Structure
//!
//! ```text
//! GET      /health                - Liveness check
//! GET      /health/ready          - Readiness check (database round-trip)
//!
//! # Stores
//! POST|PUT /api/post-store-data   - Upsert one store record
//! GET      /api/get-old-stores    - Customer ids with stale order dates
//! GET      /api/stores/nearby     - Located stores ordered by distance (GeoJSON)
//! ```
//!
//! Any other method on these paths gets `405 Method Not Allowed` with an empty
//! body from the method router.

pub mod health;
pub mod nearby;
pub mod stores;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::middleware::{make_request_span, request_id_middleware};
use crate::state::AppState;

/// Create the store API routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/post-store-data",
            axum::routing::post(stores::upsert_store).put(stores::upsert_store),
        )
        .route("/get-old-stores", get(stores::stale_stores))
        .route("/stores/nearby", get(nearby::nearby_stores))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Build the full application router with tracing and request ids.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/api", store_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}
