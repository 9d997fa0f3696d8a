//! Report generation
//!
//! Reports are built from a snapshot of the collections by pure
//! functions, so the text can be tested without a store.

pub mod kpi;
pub mod overtime;

pub use kpi::{generate_kpi_report, KpiReportData, KpiReportService, ReportScope};
pub use overtime::{
    build_overtime_report, OvertimeReport, OvertimeReportFilter, OvertimeReportRow,
    OvertimeReportService,
};
