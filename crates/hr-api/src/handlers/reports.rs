//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};
use hr_services::reports::{
    KpiReportService, OvertimeReport, OvertimeReportFilter, OvertimeReportService, ReportScope,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

#[derive(Debug, Default, Deserialize)]
pub struct KpiReportQuery {
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct KpiReportResponse {
    #[serde(rename = "_type")]
    pub type_name: &'static str,
    pub scope: String,
    pub markdown: String,
}

#[derive(Debug, Serialize)]
pub struct OvertimeReportResponse {
    #[serde(rename = "_type")]
    pub type_name: &'static str,
    #[serde(flatten)]
    pub report: OvertimeReport,
    pub markdown: String,
}

/// GET /api/v1/reports/kpi?scope=
pub async fn kpi_report(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<KpiReportQuery>,
) -> ApiResult<Json<KpiReportResponse>> {
    let scope = ReportScope::parse(query.scope.as_deref());
    let markdown = KpiReportService::new(state.store(), &user).call(&scope).await?;
    Ok(Json(KpiReportResponse {
        type_name: "KpiReport",
        scope: scope.label().to_string(),
        markdown,
    }))
}

/// GET /api/v1/reports/overtime?month=&branch=&department=
pub async fn overtime_report(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(filter): Query<OvertimeReportFilter>,
) -> ApiResult<Json<OvertimeReportResponse>> {
    let report = OvertimeReportService::new(state.store(), &user)
        .call(filter)
        .await?;
    Ok(Json(OvertimeReportResponse {
        type_name: "OvertimeReport",
        markdown: report.to_markdown(),
        report,
    }))
}
