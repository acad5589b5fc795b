//! Citizen reports: ingestion with AI enrichment, lifecycle, duplicate lookup.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/reports` | Submit a report |
//! | GET | `/api/reports` | List reports (category / radius filters) |
//! | GET | `/api/reports/{id}` | Get a report |
//! | PATCH | `/api/reports/{id}` | Staff triage update |
//! | POST | `/api/reports/{id}/verify` | Reporter confirms the fix |
//! | POST | `/api/reports/{id}/reopen` | Reporter rejects the fix |
//! | POST | `/api/reports/duplicates` | Find likely duplicates nearby |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{
    AiEnrichmentService, DuplicateScorer, DuplicateService, ReportIngestionService, ReportService,
};
