use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::dtos::{DuplicateCheckDto, DuplicateMatchDto};
use crate::features::reports::models::{Embedding, ReportStatus};
use crate::features::reports::services::enrichment_service::{enrichment_text, AiEnrichmentService};
use crate::modules::ai::{rank_by_similarity, retain_and_rank, DuplicateCandidate, DuplicateMatch};
use crate::shared::constants::{
    DEFAULT_DUPLICATE_RADIUS_METERS, DUPLICATE_SCORE_THRESHOLD, MAX_DUPLICATE_CANDIDATES,
};
use crate::shared::geo::GeoPoint;

/// An existing report considered as a possible duplicate
#[derive(Debug, Clone)]
pub struct ScoringCandidate {
    pub id: Uuid,
    pub text: String,
    pub embedding: Option<Embedding>,
}

/// Ranks existing reports by semantic similarity to a new one. Advisory only.
pub struct DuplicateScorer {
    ai: Arc<AiEnrichmentService>,
}

impl DuplicateScorer {
    pub fn new(ai: Arc<AiEnrichmentService>) -> Self {
        Self { ai }
    }

    /// Candidates scoring above the duplicate threshold, best first.
    ///
    /// Tries the batched remote check first. If that fails, embeds `new_text`
    /// and compares it with each candidate's stored embedding, embedding the
    /// candidate text when none is stored. Candidates that still have no
    /// vector are skipped.
    pub async fn find_duplicates(
        &self,
        new_text: &str,
        candidates: &[ScoringCandidate],
    ) -> Vec<DuplicateMatch> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let remote_candidates: Vec<DuplicateCandidate> = candidates
            .iter()
            .map(|c| DuplicateCandidate {
                id: c.id,
                text: c.text.clone(),
            })
            .collect();

        match self.ai.check_duplicates(new_text, &remote_candidates).await {
            Ok(matches) => {
                let known: HashSet<Uuid> = candidates.iter().map(|c| c.id).collect();
                let matches = matches
                    .into_iter()
                    .filter(|m| known.contains(&m.id))
                    .collect();
                retain_and_rank(matches, DUPLICATE_SCORE_THRESHOLD)
            }
            Err(e) => {
                tracing::warn!(
                    "Batched duplicate check failed, comparing embeddings locally: {}",
                    e
                );
                self.score_locally(new_text, candidates).await
            }
        }
    }

    async fn score_locally(
        &self,
        new_text: &str,
        candidates: &[ScoringCandidate],
    ) -> Vec<DuplicateMatch> {
        let Some(query) = self.ai.embed(new_text).await else {
            tracing::warn!("Could not embed new report text, no duplicates reported");
            return Vec::new();
        };

        let fetched: Vec<Option<Embedding>> = join_all(candidates.iter().map(|c| async move {
            match c.embedding {
                Some(_) => None,
                None => self.ai.embed(&c.text).await,
            }
        }))
        .await;

        let vectors = candidates.iter().zip(&fetched).filter_map(|(c, fetched)| {
            c.embedding
                .as_ref()
                .or(fetched.as_ref())
                .map(|e| (c.id, e.as_slice()))
        });

        rank_by_similarity(query.as_slice(), vectors, DUPLICATE_SCORE_THRESHOLD)
    }
}

#[derive(Debug, FromRow)]
struct NearbyReport {
    id: Uuid,
    title: String,
    description: String,
    status: ReportStatus,
    location: GeoPoint,
    embedding: Option<Embedding>,
}

/// Duplicate lookup for a draft report against reports stored nearby
pub struct DuplicateService {
    pool: PgPool,
    scorer: Arc<DuplicateScorer>,
}

impl DuplicateService {
    pub fn new(pool: PgPool, scorer: Arc<DuplicateScorer>) -> Self {
        Self { pool, scorer }
    }

    pub async fn check(&self, dto: &DuplicateCheckDto) -> Result<Vec<DuplicateMatchDto>> {
        let centre = GeoPoint::new(dto.latitude, dto.longitude)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let radius = dto.radius_meters.unwrap_or(DEFAULT_DUPLICATE_RADIUS_METERS);

        let nearby = self.find_nearby(&centre, radius).await?;
        tracing::debug!(
            "Checking duplicates against {} reports within {}m of {}",
            nearby.len(),
            radius,
            centre
        );

        let candidates: Vec<ScoringCandidate> = nearby
            .iter()
            .map(|r| ScoringCandidate {
                id: r.id,
                text: enrichment_text(&r.title, &r.description),
                embedding: r.embedding.clone(),
            })
            .collect();

        let text = enrichment_text(&dto.title, &dto.description);
        let matches = self.scorer.find_duplicates(&text, &candidates).await;

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                nearby.iter().find(|r| r.id == m.id).map(|r| DuplicateMatchDto {
                    report_id: r.id,
                    score: m.score,
                    title: r.title.clone(),
                    status: r.status,
                    distance_meters: centre.distance_meters(&r.location),
                })
            })
            .collect())
    }

    async fn find_nearby(
        &self,
        centre: &GeoPoint,
        radius_meters: f64,
    ) -> Result<Vec<NearbyReport>> {
        sqlx::query_as::<_, NearbyReport>(
            r#"
            SELECT id, title, description, status,
                   ST_AsText(location) AS location,
                   embedding::text AS embedding
            FROM reports
            WHERE ST_DWithin(location, ST_GeogFromText($1), $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(centre)
        .bind(radius_meters)
        .bind(MAX_DUPLICATE_CANDIDATES)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load duplicate candidates: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::features::reports::services::enrichment_service::tests::StubClient;

    fn scorer(client: Arc<StubClient>) -> DuplicateScorer {
        DuplicateScorer::new(Arc::new(AiEnrichmentService::new(client, 3)))
    }

    fn candidate(text: &str, embedding: Option<Vec<f32>>) -> ScoringCandidate {
        ScoringCandidate {
            id: Uuid::new_v4(),
            text: text.to_string(),
            embedding: embedding.map(Embedding),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_makes_no_calls() {
        let client = Arc::new(StubClient::unreachable());
        let matches = scorer(client.clone()).find_duplicates("anything", &[]).await;

        assert!(matches.is_empty());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_remote_scores_are_filtered_and_sorted() {
        let (near, far, better) = (
            candidate("Pothole. Main St", None),
            candidate("Graffiti. Park", None),
            candidate("Hole. Main Street", None),
        );
        let client = Arc::new(StubClient {
            duplicates: Some(vec![
                DuplicateMatch { id: near.id, score: 0.85 },
                DuplicateMatch { id: far.id, score: 0.2 },
                DuplicateMatch { id: better.id, score: 0.93 },
                // Not one of ours
                DuplicateMatch { id: Uuid::new_v4(), score: 0.99 },
            ]),
            ..Default::default()
        });

        let matches = scorer(client.clone())
            .find_duplicates("Pothole on Main St", &[near.clone(), far, better.clone()])
            .await;

        let ids: Vec<Uuid> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![better.id, near.id]);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_embeds_candidates_without_stored_vector() {
        let similar = candidate("Pothole. Main St", Some(vec![0.9, 0.1, 0.0]));
        let unrelated = candidate("Graffiti. Park", Some(vec![0.0, 0.0, 1.0]));
        let unembedded = candidate("Pothole. Main Street", None);

        let client = Arc::new(StubClient {
            embedding: Some(vec![1.0, 0.0, 0.0]),
            embeddings_by_text: HashMap::from([(
                "Pothole. Main Street".to_string(),
                vec![0.95, 0.05, 0.0],
            )]),
            ..Default::default()
        });

        let matches = scorer(client.clone())
            .find_duplicates(
                "Pothole on Main St",
                &[unrelated, unembedded.clone(), similar.clone()],
            )
            .await;

        let ids: Vec<Uuid> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![unembedded.id, similar.id]);
        assert!(matches.iter().all(|m| m.score > 0.6));
        // Failed batch call, the new text, then only the candidate with no stored vector
        assert_eq!(client.calls(), 3);
        assert_eq!(
            client.embedded_texts.lock().unwrap().as_slice(),
            &[
                "Pothole on Main St".to_string(),
                "Pothole. Main Street".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_candidate_that_cannot_be_embedded_is_skipped() {
        let similar = candidate("Pothole. Main St", Some(vec![0.9, 0.1, 0.0]));
        let unembedded = candidate("Pothole. Main Street", None);

        let client = Arc::new(StubClient {
            embeddings_by_text: HashMap::from([(
                "Pothole on Main St".to_string(),
                vec![1.0, 0.0, 0.0],
            )]),
            ..Default::default()
        });

        let matches = scorer(client)
            .find_duplicates("Pothole on Main St", &[unembedded, similar.clone()])
            .await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, similar.id);
    }

    #[tokio::test]
    async fn test_everything_down_yields_no_matches() {
        let client = Arc::new(StubClient::unreachable());
        let matches = scorer(client)
            .find_duplicates("Pothole", &[candidate("Pothole", Some(vec![1.0, 0.0, 0.0]))])
            .await;

        assert!(matches.is_empty());
    }
}
