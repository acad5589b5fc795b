use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::votes::handlers;
use crate::features::votes::services::VoteService;

/// Create routes for the votes feature
///
/// Protected routes (require auth middleware to be applied by caller)
pub fn routes(service: Arc<VoteService>) -> Router {
    Router::new()
        .route("/api/reports/{id}/upvote", post(handlers::upvote))
        .route("/api/reports/{id}/downvote", post(handlers::downvote))
        .with_state(service)
}
