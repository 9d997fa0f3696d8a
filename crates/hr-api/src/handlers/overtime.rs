//! Overtime claim handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::pagination::{Collection, PaginationParams};
use hr_core::traits::Id;
use hr_models::{NewOvertimeRecord, OvertimeStatus};
use hr_services::overtime::OvertimeService;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OvertimeStatus,
}

/// POST /api/v1/overtime
pub async fn submit_overtime(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(request): Json<NewOvertimeRecord>,
) -> ApiResult<impl IntoResponse> {
    let record = OvertimeService::new(state.store(), &user)
        .submit(request)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PATCH /api/v1/overtime/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = OvertimeService::new(state.store(), &user)
        .update_status(id, request.status)
        .await
        .into_result()?;
    Ok(Json(record))
}

/// DELETE /api/v1/overtime/:id
pub async fn delete_overtime(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    OvertimeService::new(state.store(), &user)
        .delete(id)
        .await
        .into_result()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/overtime/queue
pub async fn approval_queue(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let records = OvertimeService::new(state.store(), &user)
        .approver_queue()
        .await?;
    Ok(Json(Collection::paginate(records, &pagination)))
}
