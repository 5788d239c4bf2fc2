//! Route definitions.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the router. `cors` enables a permissive CORS policy.
pub fn create_router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/query", post(handlers::query))
        .route("/schema", get(handlers::schema))
        .route("/logs", get(handlers::logs))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
