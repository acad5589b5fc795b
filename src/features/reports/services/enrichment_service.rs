use std::sync::Arc;

use crate::features::reports::models::{Embedding, ReportSeverity, SeverityLabel};
use crate::modules::ai::{
    AiError, CategoryPrediction, DuplicateCandidate, DuplicateMatch, EnrichmentClient,
};
use crate::shared::constants::CATEGORY_CONFIDENCE_THRESHOLD;

impl CategoryPrediction {
    /// Strictly above the confidence threshold
    pub fn is_confident(&self) -> bool {
        self.confidence > CATEGORY_CONFIDENCE_THRESHOLD
    }
}

/// Text sent to every AI call for a report
pub fn enrichment_text(title: &str, description: &str) -> String {
    format!("{}. {}", title, description)
}

/// Severity derived from keywords when the classifier is unavailable.
/// Case-insensitive substring match.
pub fn keyword_severity(text: &str) -> ReportSeverity {
    let text = text.to_lowercase();

    if ["danger", "accident", "huge"]
        .iter()
        .any(|keyword| text.contains(keyword))
    {
        ReportSeverity::Critical
    } else if text.contains("urgent") {
        ReportSeverity::High
    } else {
        ReportSeverity::Medium
    }
}

/// Fallback policy over the AI transport.
///
/// Remote failures never reach the caller: they are logged at warn and
/// replaced by "absent" or by the local severity rule.
pub struct AiEnrichmentService {
    client: Arc<dyn EnrichmentClient>,
    embedding_dimensions: usize,
}

impl AiEnrichmentService {
    pub fn new(client: Arc<dyn EnrichmentClient>, embedding_dimensions: usize) -> Self {
        Self {
            client,
            embedding_dimensions,
        }
    }

    /// Embedding of `text`, or `None` when the service fails or returns a
    /// vector that cannot be stored (empty, wrong length, or with NaN or
    /// infinite components).
    pub async fn embed(&self, text: &str) -> Option<Embedding> {
        match self.client.embed(text).await {
            Ok(values) if values.is_empty() => {
                tracing::warn!("Embedding service returned an empty vector");
                None
            }
            Ok(values) if values.len() != self.embedding_dimensions => {
                tracing::warn!(
                    "Embedding has {} dimensions, expected {}; discarding",
                    values.len(),
                    self.embedding_dimensions
                );
                None
            }
            Ok(values) if values.iter().any(|v| !v.is_finite()) => {
                tracing::warn!("Embedding contains non-finite values; discarding");
                None
            }
            Ok(values) => Some(Embedding::from(values)),
            Err(e) => {
                tracing::warn!("Embedding generation failed: {}", e);
                None
            }
        }
    }

    pub async fn predict_category(&self, text: &str) -> Option<CategoryPrediction> {
        match self.client.predict_category(text).await {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                tracing::warn!("Category prediction failed: {}", e);
                None
            }
        }
    }

    /// Always yields a severity: the classifier's label when it is one of the
    /// four known values, the keyword rule otherwise.
    pub async fn predict_severity(&self, text: &str) -> ReportSeverity {
        match self.client.predict_severity(text).await {
            Ok(prediction) => match ReportSeverity::parse_label(&prediction.severity) {
                SeverityLabel::Known(severity) => severity,
                SeverityLabel::Unrecognized(label) => {
                    tracing::warn!(
                        "Unrecognized severity label '{}', using keyword fallback",
                        label
                    );
                    keyword_severity(text)
                }
            },
            Err(e) => {
                tracing::warn!("Severity prediction failed, using keyword fallback: {}", e);
                keyword_severity(text)
            }
        }
    }

    /// Batched remote duplicate check. Errors are returned so the scorer can
    /// pick its own fallback.
    pub async fn check_duplicates(
        &self,
        new_text: &str,
        candidates: &[DuplicateCandidate],
    ) -> Result<Vec<DuplicateMatch>, AiError> {
        self.client.check_duplicates(new_text, candidates).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::modules::ai::SeverityPrediction;

    /// Scripted [`EnrichmentClient`]. `None` fields fail with a transport error.
    #[derive(Default)]
    pub struct StubClient {
        pub embedding: Option<Vec<f32>>,
        pub category: Option<CategoryPrediction>,
        pub severity: Option<String>,
        pub duplicates: Option<Vec<DuplicateMatch>>,
        /// Per-text embeddings, taking precedence over `embedding`
        pub embeddings_by_text: HashMap<String, Vec<f32>>,
        pub calls: AtomicUsize,
        pub embedded_texts: Mutex<Vec<String>>,
    }

    impl StubClient {
        pub fn unreachable() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn down() -> AiError {
            AiError::Transport("connection refused".to_string())
        }
    }

    pub fn prediction(category: &str, confidence: f64) -> CategoryPrediction {
        CategoryPrediction {
            category: category.to_string(),
            confidence,
            all_scores: HashMap::new(),
        }
    }

    #[async_trait]
    impl EnrichmentClient for StubClient {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.embedded_texts.lock().unwrap().push(text.to_string());
            self.embeddings_by_text
                .get(text)
                .or(self.embedding.as_ref())
                .cloned()
                .ok_or_else(Self::down)
        }

        async fn predict_category(&self, _text: &str) -> Result<CategoryPrediction, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.category.clone().ok_or_else(Self::down)
        }

        async fn predict_severity(&self, _text: &str) -> Result<SeverityPrediction, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.severity
                .clone()
                .map(|severity| SeverityPrediction {
                    severity,
                    confidence: 0.9,
                })
                .ok_or_else(|| AiError::Timeout(Duration::from_secs(5)))
        }

        async fn check_duplicates(
            &self,
            _new_report_text: &str,
            _candidates: &[DuplicateCandidate],
        ) -> Result<Vec<DuplicateMatch>, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.duplicates.clone().ok_or(AiError::Status(503))
        }
    }

    fn service(client: StubClient, dimensions: usize) -> AiEnrichmentService {
        AiEnrichmentService::new(Arc::new(client), dimensions)
    }

    #[test]
    fn test_enrichment_text() {
        assert_eq!(
            enrichment_text("Big pothole on Main St", "car nearly crashed, urgent"),
            "Big pothole on Main St. car nearly crashed, urgent"
        );
    }

    #[test]
    fn test_keyword_severity() {
        assert_eq!(keyword_severity("HUGE crater"), ReportSeverity::Critical);
        assert_eq!(keyword_severity("near accident"), ReportSeverity::Critical);
        assert_eq!(keyword_severity("Dangerous wires"), ReportSeverity::Critical);
        assert_eq!(keyword_severity("Urgent fix needed"), ReportSeverity::High);
        assert_eq!(keyword_severity("faded paint"), ReportSeverity::Medium);
        assert_eq!(keyword_severity(""), ReportSeverity::Medium);
    }

    #[test]
    fn test_critical_keywords_win_over_urgent() {
        assert_eq!(
            keyword_severity("urgent: accident risk"),
            ReportSeverity::Critical
        );
    }

    #[test]
    fn test_confidence_threshold_is_strict() {
        assert!(prediction("pothole", 0.61).is_confident());
        assert!(!prediction("pothole", 0.6).is_confident());
        assert!(!prediction("pothole", 0.2).is_confident());
    }

    #[tokio::test]
    async fn test_severity_uses_known_label() {
        let ai = service(
            StubClient {
                severity: Some("low".to_string()),
                ..Default::default()
            },
            3,
        );
        // Label wins over keywords
        assert_eq!(ai.predict_severity("huge danger").await, ReportSeverity::Low);
    }

    #[tokio::test]
    async fn test_severity_falls_back_on_unknown_label() {
        let ai = service(
            StubClient {
                severity: Some("severe".to_string()),
                ..Default::default()
            },
            3,
        );
        assert_eq!(
            ai.predict_severity("this is urgent").await,
            ReportSeverity::High
        );
    }

    #[tokio::test]
    async fn test_severity_never_absent_when_unreachable() {
        let ai = service(StubClient::unreachable(), 3);
        assert_eq!(ai.predict_severity("pothole").await, ReportSeverity::Medium);
        assert_eq!(
            ai.predict_severity("huge pothole").await,
            ReportSeverity::Critical
        );
    }

    #[tokio::test]
    async fn test_embed_rejects_unusable_vectors() {
        let empty = service(
            StubClient {
                embedding: Some(vec![]),
                ..Default::default()
            },
            3,
        );
        assert_eq!(empty.embed("text").await, None);

        let wrong_length = service(
            StubClient {
                embedding: Some(vec![0.1, 0.2]),
                ..Default::default()
            },
            3,
        );
        assert_eq!(wrong_length.embed("text").await, None);

        let ok = service(
            StubClient {
                embedding: Some(vec![0.1, 0.2, 0.3]),
                ..Default::default()
            },
            3,
        );
        assert_eq!(
            ok.embed("text").await,
            Some(Embedding(vec![0.1, 0.2, 0.3]))
        );
    }

    #[tokio::test]
    async fn test_embed_rejects_non_finite_components() {
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let ai = service(
                StubClient {
                    embedding: Some(vec![0.5, bad, 0.1]),
                    ..Default::default()
                },
                3,
            );
            assert_eq!(ai.embed("text").await, None, "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_failures_become_absent() {
        let ai = service(StubClient::unreachable(), 3);
        assert_eq!(ai.embed("text").await, None);
        assert_eq!(ai.predict_category("text").await, None);
    }

    #[tokio::test]
    async fn test_real_client_against_unreachable_service() {
        use crate::core::config::AiConfig;
        use crate::modules::ai::HttpEnrichmentClient;

        let client = HttpEnrichmentClient::new(AiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            severity_timeout: Duration::from_millis(500),
            ..AiConfig::default()
        })
        .unwrap();
        let ai = AiEnrichmentService::new(Arc::new(client), 384);

        assert_eq!(
            ai.predict_severity("Big pothole on Main St. car nearly crashed, urgent")
                .await,
            ReportSeverity::High
        );
    }
}
