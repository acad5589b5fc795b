use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::votes::dtos::VoteResultDto;
use crate::features::votes::models::{RowChange, VoteAction, VoteState};

/// Service for the per-user vote ledger
pub struct VoteService {
    pool: PgPool,
}

impl VoteService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upvote(&self, user_id: &str, report_id: Uuid) -> Result<VoteResultDto> {
        self.cast(user_id, report_id, VoteAction::Upvote).await
    }

    pub async fn downvote(&self, user_id: &str, report_id: Uuid) -> Result<VoteResultDto> {
        self.cast(user_id, report_id, VoteAction::Downvote).await
    }

    /// Apply one vote action atomically.
    ///
    /// The report row is locked first, so concurrent votes on the same report
    /// run one after another and the tally always matches the vote rows.
    async fn cast(
        &self,
        user_id: &str,
        report_id: Uuid,
        action: VoteAction,
    ) -> Result<VoteResultDto> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin vote transaction: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM reports WHERE id = $1 FOR UPDATE")
            .bind(report_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock report {}: {:?}", report_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        let stored = sqlx::query_scalar::<_, i16>(
            "SELECT value FROM votes WHERE user_id = $1 AND report_id = $2",
        )
        .bind(user_id)
        .bind(report_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read vote: {:?}", e);
            AppError::Database(e)
        })?;

        let current = VoteState::from_value(stored).map_err(AppError::Internal)?;
        let transition = current.apply(action);

        let write = match transition.row_change {
            RowChange::Insert(value) => sqlx::query(
                "INSERT INTO votes (user_id, report_id, value) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(report_id)
            .bind(value),
            RowChange::Update(value) => sqlx::query(
                r#"
                UPDATE votes SET value = $3, updated_at = NOW()
                WHERE user_id = $1 AND report_id = $2
                "#,
            )
            .bind(user_id)
            .bind(report_id)
            .bind(value),
            RowChange::Delete => {
                sqlx::query("DELETE FROM votes WHERE user_id = $1 AND report_id = $2")
                    .bind(user_id)
                    .bind(report_id)
            }
        };

        write.execute(&mut *tx).await.map_err(|e| {
            tracing::error!("Failed to write vote: {:?}", e);
            AppError::Database(e)
        })?;

        let upvotes = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE reports
            SET upvotes = GREATEST(upvotes + $2, 0)
            WHERE id = $1
            RETURNING upvotes
            "#,
        )
        .bind(report_id)
        .bind(transition.upvote_delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update upvotes for report {}: {:?}", report_id, e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit vote: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Vote {:?} on report {} by {}: {:?} -> {:?}, upvotes={}",
            action,
            report_id,
            user_id,
            current,
            transition.next,
            upvotes
        );

        Ok(VoteResultDto {
            report_id,
            upvotes,
            vote: transition.next,
        })
    }
}
