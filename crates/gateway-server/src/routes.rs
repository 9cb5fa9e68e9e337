//! Route definitions for the gateway API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // OpenAI-compatible relay endpoints
        .nest("/v1", relay_routes())
        // Dashboard endpoints, also reachable under /v1
        .nest("/dashboard", dashboard_routes())
        .nest("/v1/dashboard", dashboard_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Relay routes. The handler derives the mode from the request path.
fn relay_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/completions", post(handlers::relay))
        .route("/completions", post(handlers::relay))
        .route("/embeddings", post(handlers::relay))
        .route("/engines/:model/embeddings", post(handlers::relay))
        .route("/moderations", post(handlers::relay))
        .route("/images/generations", post(handlers::relay))
        .route("/edits", post(handlers::relay))
        .route("/audio/speech", post(handlers::relay))
        .route("/audio/transcriptions", post(handlers::relay))
        .route("/audio/translations", post(handlers::relay))
}

/// Billing dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/billing/subscription", get(handlers::billing_subscription))
        .route("/billing/usage", get(handlers::billing_usage))
}
