use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::votes::models::VoteState;

/// Response DTO after an upvote or downvote
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoteResultDto {
    pub report_id: Uuid,
    /// Report's up vote tally after the change
    pub upvotes: i32,
    /// Caller's vote after the change
    pub vote: VoteState,
}
