//! Branch handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::pagination::{Collection, PaginationParams};
use hr_core::traits::Id;
use hr_models::{Banded, Branch};
use hr_services::branches::{BranchDeletion, BranchService};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

/// GET /api/v1/branches
pub async fn list_branches(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let branches = BranchService::new(state.store(), &user).list().await?;
    let cards: Vec<Banded<Branch>> = branches.into_iter().map(Banded::from).collect();
    Ok(Json(Collection::paginate(cards, &pagination)))
}

/// POST /api/v1/branches
pub async fn create_branch(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(request): Json<TitleRequest>,
) -> ApiResult<impl IntoResponse> {
    let branch = BranchService::new(state.store(), &user)
        .create(&request.title)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// PATCH /api/v1/branches/:id
pub async fn rename_branch(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<TitleRequest>,
) -> ApiResult<impl IntoResponse> {
    let branch = BranchService::new(state.store(), &user)
        .rename(id, &request.title)
        .await
        .into_result()?;
    Ok(Json(branch))
}

/// DELETE /api/v1/branches/:id
pub async fn delete_branch(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<BranchDeletion>> {
    let deletion = BranchService::new(state.store(), &user)
        .delete(id)
        .await
        .into_result()?;
    Ok(Json(deletion))
}
