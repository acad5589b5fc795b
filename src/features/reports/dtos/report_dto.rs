use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::reports::models::{Report, ReportSeverity, ReportStatus};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::geo::GeoPoint;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::CATEGORY_REGEX;

/// Request DTO for submitting a report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    /// Citizen-chosen category slug, e.g. "pothole". May be revised by the classifier.
    #[validate(
        length(min = 1, max = 64),
        regex(path = *CATEGORY_REGEX, message = "category must be a lowercase snake_case slug (e.g. 'street_light')")
    )]
    pub category: String,

    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: f64,

    #[validate(url(message = "image_url must be a valid URL"))]
    pub image_url: Option<String>,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    pub latitude: f64,
    pub longitude: f64,
    pub upvotes: i32,
    pub department_id: Option<Uuid>,
    pub assigned_team_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub citizen_feedback: Option<String>,
    pub user_id: String,
    /// Whether a semantic embedding was stored for duplicate detection
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            category: r.category,
            severity: r.severity,
            status: r.status,
            latitude: r.location.latitude,
            longitude: r.location.longitude,
            upvotes: r.upvotes,
            department_id: r.department_id,
            assigned_team_id: r.assigned_team_id,
            image_url: r.image_url,
            citizen_feedback: r.citizen_feedback,
            user_id: r.user_id,
            has_embedding: r.embedding.is_some(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Query parameters for listing reports
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Only reports with this category slug
    pub category: Option<String>,

    /// Latitude of the search centre (requires `lon` and `radius`)
    pub lat: Option<f64>,

    /// Longitude of the search centre (requires `lat` and `radius`)
    pub lon: Option<f64>,

    /// Search radius in metres (requires `lat` and `lon`)
    pub radius: Option<f64>,

    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Number of items per page (default: 10, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

impl ListReportsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page.unwrap_or(1),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Centre and radius when all three parameters are given, nothing when
    /// none are. Any other combination is rejected.
    pub fn radius_filter(&self) -> Result<Option<(GeoPoint, f64)>, AppError> {
        match (self.lat, self.lon, self.radius) {
            (None, None, None) => Ok(None),
            (Some(lat), Some(lon), Some(radius)) => {
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(AppError::BadRequest(
                        "radius must be a positive number of metres".to_string(),
                    ));
                }
                let centre =
                    GeoPoint::new(lat, lon).map_err(|e| AppError::BadRequest(e.to_string()))?;
                Ok(Some((centre, radius)))
            }
            _ => Err(AppError::BadRequest(
                "lat, lon and radius must be provided together".to_string(),
            )),
        }
    }
}

/// Request DTO for staff updates (triage, assignment, progress)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReportDto {
    pub status: Option<ReportStatus>,
    pub severity: Option<ReportSeverity>,

    #[validate(
        length(min = 1, max = 64),
        regex(path = *CATEGORY_REGEX, message = "category must be a lowercase snake_case slug (e.g. 'street_light')")
    )]
    pub category: Option<String>,

    pub department_id: Option<Uuid>,
    pub assigned_team_id: Option<Uuid>,
}

impl UpdateReportDto {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.severity.is_none()
            && self.category.is_none()
            && self.department_id.is_none()
            && self.assigned_team_id.is_none()
    }
}

/// Request DTO for a citizen confirming a resolution
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct VerifyReportDto {
    #[validate(length(max = 2000, message = "Feedback must be at most 2000 characters"))]
    pub feedback: Option<String>,
}

/// Request DTO for a citizen rejecting a resolution
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReopenReportDto {
    #[validate(length(min = 1, max = 2000, message = "Feedback must be 1-2000 characters"))]
    pub feedback: String,
}

/// Request DTO for checking a draft report against nearby reports
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct DuplicateCheckDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: f64,

    /// Search radius in metres (default: 500)
    #[validate(range(min = 1.0, max = 10000.0, message = "radius_meters must be between 1 and 10000"))]
    pub radius_meters: Option<f64>,
}

/// A nearby report that looks like the same issue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DuplicateMatchDto {
    pub report_id: Uuid,
    /// Similarity in (0.6, 1]
    pub score: f32,
    pub title: String,
    pub status: ReportStatus,
    pub distance_meters: f64,
}
