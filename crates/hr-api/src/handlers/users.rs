//! User administration handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use hr_core::pagination::{Collection, PaginationParams};
use hr_core::traits::Id;
use hr_models::NewUser;
use hr_services::users::{UpdateUser, UserService};

use super::hash;
use crate::error::ApiResult;
use crate::extractors::{AppState, ApprovedUser};

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    let users = UserService::new(state.store(), &user).list().await?;
    Ok(Json(Collection::paginate(users, &pagination)))
}

/// POST /api/v1/users
pub async fn add_user(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Json(request): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = UserService::new(state.store(), &user)
        .add(request, state.auth.password_min_length, hash)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// PATCH /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
    Json(request): Json<UpdateUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = UserService::new(state.store(), &user)
        .update(id, request)
        .await
        .into_result()?;
    Ok(Json(profile))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    ApprovedUser(user): ApprovedUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    UserService::new(state.store(), &user)
        .delete(id)
        .await
        .into_result()?;
    state.sessions.revoke_user(id);
    Ok(StatusCode::NO_CONTENT)
}
