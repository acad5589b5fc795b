use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::departments::models::Department;
use crate::features::departments::services::DepartmentDirectory;

/// Service for department reference data
pub struct DepartmentService {
    pool: PgPool,
}

impl DepartmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all departments ordered by name
    pub async fn list(&self) -> Result<Vec<Department>> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, slug, created_at
            FROM departments
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list departments: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[async_trait]
impl DepartmentDirectory for DepartmentService {
    async fn find_id_by_name(&self, name: &str) -> Result<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM departments WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up department {}: {:?}", name, e);
                AppError::Database(e)
            })
    }
}
