//! API Router configuration

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, webhooks};
use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Contract events
        .route(webhooks::SUBMISSION_ROUTE, post(handlers::submission_webhook))
        .route(webhooks::PICKED_REVIEWERS_ROUTE, post(handlers::picked_reviewers_webhook))
        // Vote delivery
        .route("/api/reviews/:thread_key/votes", post(handlers::cast_votes))
        .route("/api/reviews/:thread_key/senior-review", post(handlers::senior_review))
        .route("/api/reviews/:thread_key/retry", post(handlers::retry_review))
        // Operator inspection
        .route("/api/threads/:workflow/:thread_key", get(handlers::thread_status))
        .route("/api/threads/:workflow/:thread_key/history", get(handlers::thread_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
