use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::reports::models::Embedding;
use crate::shared::geo::GeoPoint;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
    Reopened,
}

impl ReportStatus {
    /// Status changes staff may make through the update endpoint.
    /// Closing and reopening belong to the citizen who filed the report.
    pub fn staff_can_move_to(self, next: ReportStatus) -> bool {
        use ReportStatus::*;

        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Resolved)
                | (InProgress, Resolved)
                | (Reopened, InProgress)
                | (Reopened, Resolved)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == ReportStatus::Closed
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Closed => write!(f, "closed"),
            ReportStatus::Reopened => write!(f, "reopened"),
        }
    }
}

/// Report severity enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// Outcome of reading a severity label produced outside our control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeverityLabel {
    Known(ReportSeverity),
    Unrecognized(String),
}

impl ReportSeverity {
    /// Exact, case-sensitive match on the four lowercase labels
    pub fn parse_label(label: &str) -> SeverityLabel {
        match label {
            "critical" => SeverityLabel::Known(ReportSeverity::Critical),
            "high" => SeverityLabel::Known(ReportSeverity::High),
            "medium" => SeverityLabel::Known(ReportSeverity::Medium),
            "low" => SeverityLabel::Known(ReportSeverity::Low),
            other => SeverityLabel::Unrecognized(other.to_string()),
        }
    }
}

impl std::fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSeverity::Critical => write!(f, "critical"),
            ReportSeverity::High => write!(f, "high"),
            ReportSeverity::Medium => write!(f, "medium"),
            ReportSeverity::Low => write!(f, "low"),
        }
    }
}

/// Column list shared by every query that returns a [`Report`].
/// Location and embedding travel as text, see `GeoPoint` and `Embedding`.
pub const REPORT_COLUMNS: &str = r#"
    id, title, description, category, severity, status,
    ST_AsText(location) AS location,
    embedding::text AS embedding,
    upvotes, department_id, assigned_team_id, image_url, citizen_feedback,
    user_id, created_at, updated_at
"#;

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub location: GeoPoint,
    pub embedding: Option<Embedding>,
    pub upvotes: i32,
    pub department_id: Option<Uuid>,
    pub assigned_team_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub citizen_feedback: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully enriched report, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub location: GeoPoint,
    pub embedding: Option<Embedding>,
    pub upvotes: i32,
    pub department_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub user_id: String,
}
