use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::departments::{dtos as departments_dtos, handlers as departments_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::votes::{
    dtos as votes_dtos, handlers as votes_handlers, models as votes_models,
};
use crate::shared::geo::GeoPoint;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::update_report,
        reports_handlers::verify_report,
        reports_handlers::reopen_report,
        reports_handlers::check_duplicates,
        // Votes
        votes_handlers::upvote,
        votes_handlers::downvote,
        // Departments (public)
        departments_handlers::list_departments,
    ),
    components(
        schemas(
            // Shared
            Meta,
            GeoPoint,
            // Auth
            auth::model::AuthenticatedUser,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportSeverity,
            reports_dtos::CreateReportDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::UpdateReportDto,
            reports_dtos::VerifyReportDto,
            reports_dtos::ReopenReportDto,
            reports_dtos::DuplicateCheckDto,
            reports_dtos::DuplicateMatchDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_dtos::DuplicateMatchDto>>,
            // Votes
            votes_models::VoteState,
            votes_dtos::VoteResultDto,
            ApiResponse<votes_dtos::VoteResultDto>,
            // Departments
            departments_dtos::DepartmentResponseDto,
            ApiResponse<Vec<departments_dtos::DepartmentResponseDto>>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen reports: submission, triage, verification"),
        (name = "votes", description = "Up/down votes on reports"),
        (name = "departments", description = "Municipal departments (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CityReport API",
        version = "0.1.0",
        description = "API documentation for CityReport",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
