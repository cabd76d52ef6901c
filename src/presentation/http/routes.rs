//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::auth_middleware;
use crate::presentation::middleware::logging::track_metrics;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // WebSocket gateway endpoint
        .route("/gateway", get(ws_handler))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// API v1 routes (all protected)
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/messages", message_routes())
        .nest("/mentions", mention_routes())
        .nest("/users", user_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::message::send_message))
        .route("/{message_id}/reactions", post(handlers::message::toggle_reaction))
}

fn mention_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::mention::list_mentions))
        .route("/unread_count", get(handlers::mention::unread_count))
        .route("/mark_all_read", post(handlers::mention::mark_all_read))
        .route("/{message_id}/mark_unread", post(handlers::mention::mark_unread))
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/search", get(handlers::user::search_users))
}
