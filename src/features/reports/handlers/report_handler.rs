use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    CreateReportDto, DuplicateCheckDto, DuplicateMatchDto, ListReportsQuery, ReopenReportDto,
    ReportResponseDto, UpdateReportDto, VerifyReportDto,
};
use crate::features::reports::services::{DuplicateService, ReportIngestionService, ReportService};
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub ingestion_service: Arc<ReportIngestionService>,
    pub report_service: Arc<ReportService>,
    pub duplicate_service: Arc<DuplicateService>,
}

/// Submit a new report
///
/// The report is classified, routed and embedded before it is stored. AI
/// outages degrade the enrichment but never reject the submission.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = state.ingestion_service.create_report(&user.sub, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report.into()), None, None)),
    ))
}

/// List reports (paginated), optionally by category and/or within a radius
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "List of reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 400, description = "Incomplete location filter")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<ListReportsQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = state.report_service.list(&query).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Update report triage fields (staff only)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid update or status change"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Staff access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report(
    RequireStaff(user): RequireStaff,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.update(&user, id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Confirm that a resolved report is fixed
#[utoipa::path(
    post,
    path = "/api/reports/{id}/verify",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = VerifyReportDto,
    responses(
        (status = 200, description = "Report closed", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Report is not resolved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the reporter"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn verify_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<VerifyReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.verify(&user, id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Reject a resolution and reopen the report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/reopen",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = ReopenReportDto,
    responses(
        (status = 200, description = "Report reopened", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Report is not resolved or feedback missing"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the reporter"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn reopen_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ReopenReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.reopen(&user, id, &dto).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Find nearby reports that look like the same issue
#[utoipa::path(
    post,
    path = "/api/reports/duplicates",
    request_body = DuplicateCheckDto,
    responses(
        (status = 200, description = "Likely duplicates, best match first", body = ApiResponse<Vec<DuplicateMatchDto>>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn check_duplicates(
    _user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<DuplicateCheckDto>,
) -> Result<Json<ApiResponse<Vec<DuplicateMatchDto>>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let matches = state.duplicate_service.check(&dto).await?;
    Ok(Json(ApiResponse::success(Some(matches), None, None)))
}
