use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::votes::dtos::VoteResultDto;
use crate::features::votes::services::VoteService;
use crate::shared::types::ApiResponse;

/// Upvote a report, or withdraw an existing upvote
#[utoipa::path(
    post,
    path = "/api/reports/{id}/upvote",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Vote recorded", body = ApiResponse<VoteResultDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "votes"
)]
pub async fn upvote(
    user: AuthenticatedUser,
    State(service): State<Arc<VoteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoteResultDto>>> {
    let result = service.upvote(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}

/// Downvote a report, or withdraw an existing downvote
#[utoipa::path(
    post,
    path = "/api/reports/{id}/downvote",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Vote recorded", body = ApiResponse<VoteResultDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "votes"
)]
pub async fn downvote(
    user: AuthenticatedUser,
    State(service): State<Arc<VoteService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VoteResultDto>>> {
    let result = service.downvote(&user.sub, id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
