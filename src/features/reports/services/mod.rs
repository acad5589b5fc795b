mod duplicate_service;
mod enrichment_service;
mod ingestion_service;
mod report_service;

pub use duplicate_service::{DuplicateScorer, DuplicateService, ScoringCandidate};
pub use enrichment_service::{enrichment_text, keyword_severity, AiEnrichmentService};
pub use ingestion_service::{build_new_report, Enrichment, ReportIngestionService};
pub use report_service::{check_citizen_transition, check_staff_status_change, ReportService};

#[cfg(test)]
pub(crate) use enrichment_service::tests::StubClient;
