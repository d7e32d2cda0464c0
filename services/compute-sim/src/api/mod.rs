//! HTTP API handlers and routing.

pub mod error;
mod health;
pub mod request_context;
pub mod response;
mod v2_1;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest("/v2.1", v2_1::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
