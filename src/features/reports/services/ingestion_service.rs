use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::departments::DepartmentRouter;
use crate::features::reports::dtos::CreateReportDto;
use crate::features::reports::models::{
    Embedding, NewReport, Report, ReportSeverity, ReportStatus, REPORT_COLUMNS,
};
use crate::features::reports::services::enrichment_service::{enrichment_text, AiEnrichmentService};
use crate::shared::geo::GeoPoint;
use crate::shared::validation::CATEGORY_REGEX;

/// What the AI pipeline contributed to a submission
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Classifier's category when confident, otherwise the citizen's
    pub category: String,
    pub department_id: Option<Uuid>,
    pub severity: ReportSeverity,
    pub embedding: Option<Embedding>,
}

/// Explicit mapping from a validated submission plus enrichment to the row
/// that will be inserted. New reports always start pending with no votes.
pub fn build_new_report(
    user_id: &str,
    dto: CreateReportDto,
    location: GeoPoint,
    enrichment: Enrichment,
) -> NewReport {
    NewReport {
        title: dto.title,
        description: dto.description,
        category: enrichment.category,
        severity: enrichment.severity,
        status: ReportStatus::Pending,
        location,
        embedding: enrichment.embedding,
        upvotes: 0,
        department_id: enrichment.department_id,
        image_url: dto.image_url,
        user_id: user_id.to_string(),
    }
}

/// Turns a citizen submission into a stored, enriched report.
///
/// AI calls only ever improve a report; none of them can stop it from being
/// stored. The only failure after validation is persistence.
pub struct ReportIngestionService {
    pool: PgPool,
    ai: Arc<AiEnrichmentService>,
    router: Arc<DepartmentRouter>,
}

impl ReportIngestionService {
    pub fn new(pool: PgPool, ai: Arc<AiEnrichmentService>, router: Arc<DepartmentRouter>) -> Self {
        Self { pool, ai, router }
    }

    pub async fn create_report(&self, user_id: &str, dto: CreateReportDto) -> Result<Report> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let location = GeoPoint::new(dto.latitude, dto.longitude)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let enrichment = self.enrich(&dto).await;
        let new_report = build_new_report(user_id, dto, location, enrichment);

        self.insert(&new_report).await
    }

    /// Run category, severity and embedding calls concurrently.
    /// Department routing waits only on the category.
    pub async fn enrich(&self, dto: &CreateReportDto) -> Enrichment {
        let text = enrichment_text(&dto.title, &dto.description);

        let category_and_department = async {
            let category = self.working_category(&text, &dto.category).await;
            let department_id = self.router.route(&category).await;
            (category, department_id)
        };

        let ((category, department_id), severity, embedding) = tokio::join!(
            category_and_department,
            self.ai.predict_severity(&text),
            self.ai.embed(&text),
        );

        Enrichment {
            category,
            department_id,
            severity,
            embedding,
        }
    }

    async fn working_category(&self, text: &str, submitted: &str) -> String {
        match self.ai.predict_category(text).await {
            Some(prediction) if prediction.is_confident() => {
                if prediction.category.len() <= 64
                    && CATEGORY_REGEX.is_match(&prediction.category)
                {
                    if prediction.category != submitted {
                        tracing::info!(
                            "Category revised from '{}' to '{}' (confidence {:.2})",
                            submitted,
                            prediction.category,
                            prediction.confidence
                        );
                    }
                    prediction.category
                } else {
                    tracing::warn!(
                        "Classifier returned unusable category '{}', keeping '{}'",
                        prediction.category,
                        submitted
                    );
                    submitted.to_string()
                }
            }
            Some(prediction) => {
                tracing::debug!(
                    "Low confidence category '{}' ({:.2}), keeping '{}'",
                    prediction.category,
                    prediction.confidence,
                    submitted
                );
                submitted.to_string()
            }
            None => submitted.to_string(),
        }
    }

    async fn insert(&self, report: &NewReport) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin report transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let query = format!(
            r#"
            INSERT INTO reports (
                title, description, category, severity, status,
                location, embedding, upvotes, department_id, image_url, user_id
            )
            VALUES (
                $1, $2, $3, $4, $5,
                ST_GeogFromText($6), $7::text::vector, $8, $9, $10, $11
            )
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let created = sqlx::query_as::<_, Report>(&query)
            .bind(&report.title)
            .bind(&report.description)
            .bind(&report.category)
            .bind(report.severity)
            .bind(report.status)
            .bind(report.location)
            .bind(&report.embedding)
            .bind(report.upvotes)
            .bind(report.department_id)
            .bind(&report.image_url)
            .bind(&report.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report {} (category={}, severity={}, department={:?}, embedded={}) for user {}",
            created.id,
            created.category,
            created.severity,
            created.department_id,
            created.embedding.is_some(),
            created.user_id
        );

        Ok(created)
    }
}
