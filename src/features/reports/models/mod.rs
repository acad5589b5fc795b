mod embedding;
mod report;

pub use embedding::Embedding;
pub use report::{
    NewReport, Report, ReportSeverity, ReportStatus, SeverityLabel, REPORT_COLUMNS,
};
