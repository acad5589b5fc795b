mod report_handler;

pub use report_handler::{
    __path_check_duplicates, __path_create_report, __path_get_report, __path_list_reports,
    __path_reopen_report, __path_update_report, __path_verify_report, check_duplicates,
    create_report, get_report, list_reports, reopen_report, update_report, verify_report,
    ReportState,
};
