use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    ListReportsQuery, ReopenReportDto, UpdateReportDto, VerifyReportDto,
};
use crate::features::reports::models::{Report, ReportStatus, REPORT_COLUMNS};

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Owner (or an admin) acting on a report awaiting their confirmation
pub fn check_citizen_transition(user: &AuthenticatedUser, report: &Report) -> Result<()> {
    if !user.can_act_as_owner(&report.user_id) {
        return Err(AppError::Forbidden(
            "Only the reporter can confirm or reopen this report".to_string(),
        ));
    }

    if report.status != ReportStatus::Resolved {
        return Err(AppError::BadRequest(format!(
            "Report is not in resolved state (current: {})",
            report.status
        )));
    }

    Ok(())
}

/// Staff status changes must move forward. Repeating the current status is a no-op.
pub fn check_staff_status_change(current: ReportStatus, requested: ReportStatus) -> Result<()> {
    if current.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Report is {} and can no longer change status",
            current
        )));
    }

    if requested == current || current.staff_can_move_to(requested) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Cannot change status from {} to {}",
            current, requested
        )))
    }
}

/// Service for reading reports and moving them through their lifecycle
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List reports, newest first, with total count for pagination
    pub async fn list(&self, query: &ListReportsQuery) -> Result<(Vec<Report>, i64)> {
        let area = query.radius_filter()?;
        let (centre, radius) = match area {
            Some((centre, radius)) => (Some(centre), Some(radius)),
            None => (None, None),
        };
        let pagination = query.pagination();

        const FILTER: &str = r#"
            WHERE ($1::varchar IS NULL OR category = $1)
              AND ($2::text IS NULL OR ST_DWithin(location, ST_GeogFromText($2), $3::float8))
        "#;

        let total =
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM reports {}", FILTER))
                .bind(&query.category)
                .bind(centre)
                .bind(radius)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports: {:?}", e);
                    AppError::Database(e)
                })?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports {} ORDER BY created_at DESC OFFSET $4 LIMIT $5",
            REPORT_COLUMNS, FILTER
        ))
        .bind(&query.category)
        .bind(centre)
        .bind(radius)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((reports, total))
    }

    /// Get report by ID
    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Citizen confirms the fix: resolved -> closed
    pub async fn verify(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: &VerifyReportDto,
    ) -> Result<Report> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let feedback = dto
            .feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty());

        self.citizen_transition(user, id, ReportStatus::Closed, feedback)
            .await
    }

    /// Citizen rejects the fix: resolved -> reopened
    pub async fn reopen(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: &ReopenReportDto,
    ) -> Result<Report> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let feedback = dto.feedback.trim();
        if feedback.is_empty() {
            return Err(AppError::Validation(
                "Feedback is required to reopen a report".to_string(),
            ));
        }

        self.citizen_transition(user, id, ReportStatus::Reopened, Some(feedback))
            .await
    }

    async fn citizen_transition(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        next: ReportStatus,
        feedback: Option<&str>,
    ) -> Result<Report> {
        let mut tx = self.begin().await?;
        let report = Self::lock(&mut tx, id).await?;

        check_citizen_transition(user, &report)?;

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2, citizen_feedback = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(next)
        .bind(feedback)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        Self::commit(tx).await?;

        tracing::info!(
            "Report {} moved {} -> {} by {}",
            id,
            report.status,
            updated.status,
            user.sub
        );

        Ok(updated)
    }

    /// Staff triage: status (forward only), severity, category, assignment
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: &UpdateReportDto,
    ) -> Result<Report> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if dto.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut tx = self.begin().await?;
        let report = Self::lock(&mut tx, id).await?;

        if let Some(requested) = dto.status {
            check_staff_status_change(report.status, requested)?;
        }

        let updated = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET status = COALESCE($2, status),
                severity = COALESCE($3, severity),
                category = COALESCE($4, category),
                department_id = COALESCE($5, department_id),
                assigned_team_id = COALESCE($6, assigned_team_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(dto.status)
        .bind(dto.severity)
        .bind(&dto.category)
        .bind(dto.department_id)
        .bind(dto.assigned_team_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let fk_violation = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
            if fk_violation {
                return AppError::BadRequest("Unknown department".to_string());
            }
            tracing::error!("Failed to update report: {:?}", e);
            AppError::Database(e)
        })?;

        Self::commit(tx).await?;

        tracing::info!("Report {} updated by staff {}", id, user.sub);

        Ok(updated)
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn commit(tx: Transaction<'static, Postgres>) -> Result<()> {
        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn lock(tx: &mut Transaction<'static, Postgres>, id: Uuid) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports WHERE id = $1 FOR UPDATE",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock report {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fake::{Fake, Faker};

    use crate::features::reports::models::ReportSeverity;
    use crate::shared::geo::GeoPoint;
    use crate::shared::test_helpers::{create_admin_user, create_citizen_user};

    fn report_owned_by(owner: &str, status: ReportStatus) -> Report {
        Report {
            id: Faker.fake(),
            title: "Streetlight out".to_string(),
            description: "Dark corner near the school".to_string(),
            category: "street_light".to_string(),
            severity: ReportSeverity::Medium,
            status,
            location: GeoPoint::new(12.9, 77.6).unwrap(),
            embedding: None,
            upvotes: 0,
            department_id: None,
            assigned_team_id: None,
            image_url: None,
            citizen_feedback: None,
            user_id: owner.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_can_close_resolved_report() {
        let report = report_owned_by("alice", ReportStatus::Resolved);
        assert!(check_citizen_transition(&create_citizen_user("alice"), &report).is_ok());
    }

    #[test]
    fn test_admin_acts_for_owner() {
        let report = report_owned_by("alice", ReportStatus::Resolved);
        assert!(check_citizen_transition(&create_admin_user(), &report).is_ok());
    }

    #[test]
    fn test_stranger_is_forbidden() {
        let report = report_owned_by("alice", ReportStatus::Resolved);
        assert!(matches!(
            check_citizen_transition(&create_citizen_user("bob"), &report),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_unresolved_report_cannot_be_confirmed() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::InProgress,
            ReportStatus::Closed,
            ReportStatus::Reopened,
        ] {
            let report = report_owned_by("alice", status);
            assert!(matches!(
                check_citizen_transition(&create_citizen_user("alice"), &report),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_staff_status_change_rules() {
        assert!(check_staff_status_change(ReportStatus::Pending, ReportStatus::InProgress).is_ok());
        assert!(check_staff_status_change(ReportStatus::Reopened, ReportStatus::Resolved).is_ok());
        assert!(
            check_staff_status_change(ReportStatus::InProgress, ReportStatus::InProgress).is_ok()
        );

        assert!(check_staff_status_change(ReportStatus::Resolved, ReportStatus::Pending).is_err());
        assert!(check_staff_status_change(ReportStatus::Resolved, ReportStatus::Closed).is_err());
        assert!(check_staff_status_change(ReportStatus::Closed, ReportStatus::InProgress).is_err());
    }

    #[test]
    fn test_closed_report_rejects_every_status() {
        for requested in [
            ReportStatus::Pending,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Closed,
            ReportStatus::Reopened,
        ] {
            assert!(matches!(
                check_staff_status_change(ReportStatus::Closed, requested),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_reopen_requires_feedback() {
        let service = ReportService::new(crate::shared::test_helpers::lazy_pool());
        let dto = ReopenReportDto {
            feedback: "   ".to_string(),
        };

        let result = service
            .reopen(&create_citizen_user("alice"), uuid::Uuid::new_v4(), &dto)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let service = ReportService::new(crate::shared::test_helpers::lazy_pool());

        let result = service
            .update(&create_admin_user(), uuid::Uuid::new_v4(), &UpdateReportDto::default())
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
