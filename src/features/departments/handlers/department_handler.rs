use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::departments::dtos::DepartmentResponseDto;
use crate::features::departments::services::DepartmentService;
use crate::shared::types::ApiResponse;

/// List municipal departments
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "List of departments", body = ApiResponse<Vec<DepartmentResponseDto>>)
    ),
    tag = "departments"
)]
pub async fn list_departments(
    State(service): State<Arc<DepartmentService>>,
) -> Result<Json<ApiResponse<Vec<DepartmentResponseDto>>>> {
    let departments = service.list().await?;
    let dtos: Vec<DepartmentResponseDto> = departments.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}
