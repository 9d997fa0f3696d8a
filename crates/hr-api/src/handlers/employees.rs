//! Employee handlers, including KPI ratings and the overtime history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::pagination::{Collection, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Banded, KpiScorecard, MetricRating, MetricsUpdate, NewEmployee, UpdateEmployee};
use hr_services::employees::EmployeeService;
use hr_services::kpi::KpiService;
use hr_services::overtime::OvertimeService;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    pub branch: Option<String>,
    pub department: Option<String>,
}

/// Scorecard with its band and a label per rated metric
#[derive(Debug, Serialize)]
pub struct ScorecardView {
    #[serde(flatten)]
    pub card: Banded<KpiScorecard>,
    pub ratings: Vec<MetricRating>,
}

impl From<KpiScorecard> for ScorecardView {
    fn from(scorecard: KpiScorecard) -> Self {
        let ratings = scorecard.ratings();
        Self {
            card: Banded::from(scorecard),
            ratings,
        }
    }
}

/// GET /api/v1/employees?branch=&department=
pub async fn list_employees(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<EmployeeQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let employees = EmployeeService::new(state.store(), &user)
        .list(query.branch.as_deref(), query.department.as_deref())
        .await?;
    Ok(Json(Collection::paginate(employees, &pagination)))
}

/// GET /api/v1/employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(state.store(), &user).get(id).await?;
    Ok(Json(employee))
}

/// POST /api/v1/employees
pub async fn create_employee(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(request): Json<NewEmployee>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(state.store(), &user)
        .add(request)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// PATCH /api/v1/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateEmployee>,
) -> ApiResult<impl IntoResponse> {
    let employee = EmployeeService::new(state.store(), &user)
        .edit(id, request)
        .await
        .into_result()?;
    Ok(Json(employee))
}

/// DELETE /api/v1/employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    EmployeeService::new(state.store(), &user)
        .delete(id)
        .await
        .into_result()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/employees/:id/scorecard
pub async fn get_scorecard(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<ScorecardView>> {
    let scorecard = KpiService::new(state.store(), &user).scorecard(id).await?;
    Ok(Json(scorecard.into()))
}

/// PUT /api/v1/employees/:id/metrics
pub async fn update_metrics(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<MetricsUpdate>,
) -> ApiResult<Json<ScorecardView>> {
    let scorecard = KpiService::new(state.store(), &user)
        .update_metrics(id, request.metrics)
        .await
        .into_result()?;
    Ok(Json(scorecard.into()))
}

/// GET /api/v1/employees/:id/overtime
pub async fn employee_overtime(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let records = OvertimeService::new(state.store(), &user)
        .records_for_employee(id)
        .await?;
    Ok(Json(Collection::paginate(records, &pagination)))
}
