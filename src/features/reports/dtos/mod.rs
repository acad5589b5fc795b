mod report_dto;

pub use report_dto::{
    CreateReportDto, DuplicateCheckDto, DuplicateMatchDto, ListReportsQuery, ReopenReportDto,
    ReportResponseDto, UpdateReportDto, VerifyReportDto,
};
