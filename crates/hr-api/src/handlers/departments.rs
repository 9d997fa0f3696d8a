//! Department handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::pagination::{Collection, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Banded, Department};
use hr_services::departments::DepartmentService;
use serde::{Deserialize, Serialize};

use super::branches::TitleRequest;
use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentQuery {
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub branch: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDeletion {
    pub deleted_employees: usize,
}

/// GET /api/v1/departments?branch=
pub async fn list_departments(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(query): Query<DepartmentQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let departments = DepartmentService::new(state.store(), &user)
        .list(query.branch.as_deref())
        .await?;
    let cards: Vec<Banded<Department>> = departments.into_iter().map(Banded::from).collect();
    Ok(Json(Collection::paginate(cards, &pagination)))
}

/// POST /api/v1/departments
pub async fn create_department(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(request): Json<CreateDepartmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let department = DepartmentService::new(state.store(), &user)
        .create(&request.branch, &request.title)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(department)))
}

/// PATCH /api/v1/departments/:id
pub async fn rename_department(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<TitleRequest>,
) -> ApiResult<impl IntoResponse> {
    let department = DepartmentService::new(state.store(), &user)
        .rename(id, &request.title)
        .await
        .into_result()?;
    Ok(Json(department))
}

/// DELETE /api/v1/departments/:id
pub async fn delete_department(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<DepartmentDeletion>> {
    let deleted_employees = DepartmentService::new(state.store(), &user)
        .delete(id)
        .await
        .into_result()?;
    Ok(Json(DepartmentDeletion { deleted_employees }))
}
