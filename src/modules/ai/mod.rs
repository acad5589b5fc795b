//! AI enrichment service integration
//!
//! Transport for the embedding / zero-shot classification service and the
//! vector math used to compare embeddings locally.

mod client;
mod similarity;

pub use client::{
    AiError, CategoryPrediction, DuplicateCandidate, DuplicateMatch, EnrichmentClient,
    HttpEnrichmentClient, SeverityPrediction,
};
pub use similarity::{cosine_similarity, rank_by_similarity, retain_and_rank};
