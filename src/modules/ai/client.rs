//! HTTP client for the AI enrichment service.
//!
//! Endpoints (JSON in, JSON out, all stateless):
//! - `POST /embed            {text}` -> `{embedding}`
//! - `POST /predict_category {text}` -> `{category, confidence, all_scores}`
//! - `POST /predict_severity {text}` -> `{severity, confidence}`
//! - `POST /check_duplicates {new_report_text, candidates}` -> `{matches}`
//!
//! Every call is a single attempt bounded by its own timeout. Failures come
//! back as [`AiError`]; deciding what to do about them is the caller's job.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::core::config::AiConfig;
use crate::core::error::AppError;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI request failed: {0}")]
    Transport(String),

    #[error("AI service returned HTTP {0}")]
    Status(u16),

    #[error("Failed to decode AI response: {0}")]
    Decode(String),
}

/// Top label from the zero-shot category classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category: String,
    pub confidence: f64,
    #[serde(default)]
    pub all_scores: HashMap<String, f64>,
}

/// Raw severity label; parsing into a domain value is left to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityPrediction {
    pub severity: String,
    #[serde(default)]
    pub confidence: f64,
}

/// An existing report offered to the batched duplicate check
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCandidate {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateMatch {
    pub id: Uuid,
    pub score: f32,
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Candidates travel with their position in the request as id; the service
/// only accepts integer ids.
#[derive(Debug, Serialize)]
struct DuplicateCheckRequest<'a> {
    new_report_text: &'a str,
    candidates: Vec<WireCandidate<'a>>,
}

#[derive(Debug, Serialize)]
struct WireCandidate<'a> {
    id: usize,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct DuplicateCheckResponse {
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    id: i64,
    score: f32,
}

/// Remote AI capabilities used by report ingestion and duplicate scoring
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError>;

    async fn predict_category(&self, text: &str) -> Result<CategoryPrediction, AiError>;

    async fn predict_severity(&self, text: &str) -> Result<SeverityPrediction, AiError>;

    async fn check_duplicates(
        &self,
        new_report_text: &str,
        candidates: &[DuplicateCandidate],
    ) -> Result<Vec<DuplicateMatch>, AiError>;
}

/// reqwest-backed [`EnrichmentClient`]. Holds network configuration only.
pub struct HttpEnrichmentClient {
    client: reqwest::Client,
    config: AiConfig,
}

impl HttpEnrichmentClient {
    pub fn new(config: AiConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent("CityReportCore/0.1 (report-enrichment)")
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build AI HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, timeout: Duration) -> Result<R, AiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url, path);

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Status(status.as_u16()));
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                AiError::Timeout(timeout)
            } else {
                AiError::Decode(e.to_string())
            }
        })
    }

    fn classify(error: reqwest::Error, timeout: Duration) -> AiError {
        if error.is_timeout() {
            AiError::Timeout(timeout)
        } else {
            AiError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl EnrichmentClient for HttpEnrichmentClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
        let response: EmbedResponse = self
            .post_json("/embed", &TextRequest { text }, self.config.embed_timeout)
            .await?;
        Ok(response.embedding)
    }

    async fn predict_category(&self, text: &str) -> Result<CategoryPrediction, AiError> {
        self.post_json(
            "/predict_category",
            &TextRequest { text },
            self.config.category_timeout,
        )
        .await
    }

    async fn predict_severity(&self, text: &str) -> Result<SeverityPrediction, AiError> {
        self.post_json(
            "/predict_severity",
            &TextRequest { text },
            self.config.severity_timeout,
        )
        .await
    }

    async fn check_duplicates(
        &self,
        new_report_text: &str,
        candidates: &[DuplicateCandidate],
    ) -> Result<Vec<DuplicateMatch>, AiError> {
        let request = DuplicateCheckRequest {
            new_report_text,
            candidates: candidates
                .iter()
                .enumerate()
                .map(|(id, c)| WireCandidate { id, text: &c.text })
                .collect(),
        };
        let response: DuplicateCheckResponse = self
            .post_json("/check_duplicates", &request, self.config.duplicate_timeout)
            .await?;

        Ok(response
            .matches
            .into_iter()
            .filter_map(|m| {
                let candidate = usize::try_from(m.id)
                    .ok()
                    .and_then(|index| candidates.get(index));
                if candidate.is_none() {
                    tracing::warn!("Duplicate check returned unknown candidate id {}", m.id);
                }
                candidate.map(|c| DuplicateMatch {
                    id: c.id,
                    score: m.score,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_ai_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> HttpEnrichmentClient {
        HttpEnrichmentClient::new(AiConfig {
            base_url,
            embed_timeout: Duration::from_millis(300),
            category_timeout: Duration::from_millis(300),
            severity_timeout: Duration::from_millis(300),
            duplicate_timeout: Duration::from_millis(300),
            ..AiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_parses_vector() {
        let router = Router::new().route(
            "/embed",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["text"], "Pothole. Deep hole");
                Json(json!({ "embedding": [0.1, 0.2, 0.3] }))
            }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let embedding = client.embed("Pothole. Deep hole").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_predict_category_parses_scores() {
        let router = Router::new().route(
            "/predict_category",
            post(|| async {
                Json(json!({
                    "category": "pothole",
                    "confidence": 0.82,
                    "all_scores": { "pothole": 0.82, "other": 0.18 }
                }))
            }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let prediction = client.predict_category("hole in road").await.unwrap();
        assert_eq!(prediction.category, "pothole");
        assert_eq!(prediction.confidence, 0.82);
        assert_eq!(prediction.all_scores.get("other"), Some(&0.18));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let router = Router::new().route(
            "/predict_category",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let err = client.predict_category("anything").await.unwrap_err();
        assert!(matches!(err, AiError::Status(503)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let router = Router::new().route(
            "/predict_severity",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({ "severity": "low", "confidence": 0.9 }))
            }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let err = client.predict_severity("slow").await.unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let router = Router::new().route(
            "/embed",
            post(|| async { Json(json!({ "vector": [1.0] })) }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let err = client.embed("text").await.unwrap_err();
        assert!(matches!(err, AiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client = client_for("http://127.0.0.1:1".to_string());

        let err = client.embed("text").await.unwrap_err();
        assert!(matches!(err, AiError::Transport(_) | AiError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_check_duplicates_uses_integer_ids_on_the_wire() {
        let (graffiti, hole) = (Uuid::now_v7(), Uuid::now_v7());
        let router = Router::new().route(
            "/check_duplicates",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["new_report_text"], "Pothole. Main St");
                assert_eq!(body["candidates"][0]["id"], 0);
                assert_eq!(body["candidates"][1]["id"], 1);
                assert_eq!(body["candidates"][1]["text"], "Hole. Main Street");
                Json(json!({
                    "matches": [
                        { "id": 1, "score": 0.91 },
                        { "id": 7, "score": 0.99 },
                        { "id": -1, "score": 0.95 }
                    ]
                }))
            }),
        );
        let client = client_for(spawn_ai_stub(router).await);

        let matches = client
            .check_duplicates(
                "Pothole. Main St",
                &[
                    DuplicateCandidate {
                        id: graffiti,
                        text: "Graffiti. Park wall".to_string(),
                    },
                    DuplicateCandidate {
                        id: hole,
                        text: "Hole. Main Street".to_string(),
                    },
                ],
            )
            .await
            .unwrap();

        assert_eq!(matches, vec![DuplicateMatch { id: hole, score: 0.91 }]);
    }
}
