use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::departments::handlers;
use crate::features::departments::services::DepartmentService;

/// Create routes for the departments feature (public)
pub fn routes(service: Arc<DepartmentService>) -> Router {
    Router::new()
        .route("/api/departments", get(handlers::list_departments))
        .with_state(service)
}
