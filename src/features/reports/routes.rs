use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::{DuplicateService, ReportIngestionService, ReportService};

fn state(
    ingestion_service: Arc<ReportIngestionService>,
    report_service: Arc<ReportService>,
    duplicate_service: Arc<DuplicateService>,
) -> ReportState {
    ReportState {
        ingestion_service,
        report_service,
        duplicate_service,
    }
}

/// Read-only report routes (no authentication)
pub fn public_routes(
    ingestion_service: Arc<ReportIngestionService>,
    report_service: Arc<ReportService>,
    duplicate_service: Arc<DuplicateService>,
) -> Router {
    Router::new()
        .route("/api/reports", get(handlers::list_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .with_state(state(ingestion_service, report_service, duplicate_service))
}

/// Report routes that act on behalf of a user
///
/// Protected routes (require auth middleware to be applied by caller)
pub fn protected_routes(
    ingestion_service: Arc<ReportIngestionService>,
    report_service: Arc<ReportService>,
    duplicate_service: Arc<DuplicateService>,
) -> Router {
    Router::new()
        .route("/api/reports", post(handlers::create_report))
        .route(
            "/api/reports/{id}",
            axum::routing::patch(handlers::update_report),
        )
        .route("/api/reports/{id}/verify", post(handlers::verify_report))
        .route("/api/reports/{id}/reopen", post(handlers::reopen_report))
        .route("/api/reports/duplicates", post(handlers::check_duplicates))
        .with_state(state(ingestion_service, report_service, duplicate_service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::features::departments::services::InMemoryDirectory;
    use crate::features::departments::DepartmentRouter;
    use crate::features::reports::services::{AiEnrichmentService, DuplicateScorer, StubClient};
    use crate::shared::test_helpers::{
        create_admin_user, create_citizen_user, lazy_pool, with_user,
    };

    fn services(
        client: Arc<StubClient>,
    ) -> (
        Arc<ReportIngestionService>,
        Arc<ReportService>,
        Arc<DuplicateService>,
    ) {
        let pool = lazy_pool();
        let ai = Arc::new(AiEnrichmentService::new(client, 384));
        let router = Arc::new(DepartmentRouter::new(Arc::new(InMemoryDirectory::seeded())));
        let scorer = Arc::new(DuplicateScorer::new(Arc::clone(&ai)));

        (
            Arc::new(ReportIngestionService::new(pool.clone(), ai, router)),
            Arc::new(ReportService::new(pool.clone())),
            Arc::new(DuplicateService::new(pool, scorer)),
        )
    }

    fn app(client: Arc<StubClient>) -> Router {
        let (ingestion, reports, duplicates) = services(client);
        Router::new()
            .merge(public_routes(
                Arc::clone(&ingestion),
                Arc::clone(&reports),
                Arc::clone(&duplicates),
            ))
            .merge(protected_routes(ingestion, reports, duplicates))
    }

    fn server_as(
        router: Router,
        user: crate::features::auth::model::AuthenticatedUser,
    ) -> TestServer {
        TestServer::new(with_user(router, user)).unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let server = TestServer::new(app(Arc::new(StubClient::unreachable()))).unwrap();

        let response = server
            .post("/api/reports")
            .json(&json!({
                "title": "Pothole",
                "description": "Deep",
                "category": "pothole",
                "latitude": 12.9,
                "longitude": 77.6
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_submission_before_enrichment() {
        let client = Arc::new(StubClient::unreachable());
        let server = server_as(app(client.clone()), create_citizen_user("alice"));

        let response = server
            .post("/api/reports")
            .json(&json!({
                "title": "",
                "description": "Deep",
                "category": "pothole",
                "latitude": 200.0,
                "longitude": 77.6
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let server = server_as(
            app(Arc::new(StubClient::unreachable())),
            create_citizen_user("alice"),
        );

        let response = server
            .post("/api/reports")
            .json(&json!({ "title": "Pothole" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_partial_radius_filter() {
        let server = TestServer::new(app(Arc::new(StubClient::unreachable()))).unwrap();

        let response = server.get("/api/reports?lat=12.9&radius=500").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_rejects_non_numeric_query() {
        let server = TestServer::new(app(Arc::new(StubClient::unreachable()))).unwrap();

        let response = server.get("/api/reports?page=first").await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_citizen_cannot_update_report() {
        let server = server_as(
            app(Arc::new(StubClient::unreachable())),
            create_citizen_user("alice"),
        );

        let response = server
            .patch(&format!("/api/reports/{}", uuid::Uuid::new_v4()))
            .json(&json!({ "status": "resolved" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_staff_update_validates_category() {
        let server = server_as(app(Arc::new(StubClient::unreachable())), create_admin_user());

        let response = server
            .patch(&format!("/api/reports/{}", uuid::Uuid::new_v4()))
            .json(&json!({ "category": "Not A Slug" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reopen_requires_feedback_field() {
        let server = server_as(
            app(Arc::new(StubClient::unreachable())),
            create_citizen_user("alice"),
        );

        let response = server
            .post(&format!("/api/reports/{}/reopen", uuid::Uuid::new_v4()))
            .json(&json!({}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_check_validates_radius() {
        let client = Arc::new(StubClient::unreachable());
        let server = server_as(app(client.clone()), create_citizen_user("alice"));

        let response = server
            .post("/api/reports/duplicates")
            .json(&json!({
                "title": "Pothole",
                "description": "Deep",
                "latitude": 12.9,
                "longitude": 77.6,
                "radius_meters": 0.0
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_report_rejects_malformed_id() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let response = app(Arc::new(StubClient::unreachable()))
            .oneshot(
                Request::builder()
                    .uri("/api/reports/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
