//! Registration, login and the current session

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use hr_auth::{evaluate, verify_password, CurrentUser, Requirement, SessionState};
use hr_core::error::HrError;
use hr_models::{NewUser, UserProfile};
use serde::{Deserialize, Serialize};

use super::hash;
use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: CurrentUser,
    /// Where the dashboard should land
    pub redirect_to: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: CurrentUser,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub redirect_to: &'static str,
}

fn landing_path(user: &CurrentUser) -> &'static str {
    evaluate(
        &SessionState::Authenticated(user.clone()),
        &Requirement::any_role(),
    )
    .redirect_path()
    .unwrap_or_else(|| user.role.dashboard_path())
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let profile: UserProfile = state.accounts().register(request, hash).await.into_result()?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let profile = state
        .accounts()
        .authenticate(request.email.trim(), |stored| {
            verify_password(&request.password, stored)
        })
        .await?;

    let session = state
        .sessions
        .create(profile.id, state.jwt.expires_in_seconds());
    let token = state
        .jwt
        .create_token(&profile, Some(session.id))
        .map_err(HrError::from)?;

    let user = CurrentUser::from(&profile);
    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in_seconds(),
        redirect_to: landing_path(&user),
        user,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<AppState>, auth: AuthenticatedUser) -> StatusCode {
    state.sessions.revoke(&auth.session_id);
    tracing::info!(user_id = %auth.id, "user logged out");
    StatusCode::NO_CONTENT
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<MeResponse>> {
    let profile = state
        .store()
        .get_user(auth.id)
        .await
        .map_err(HrError::from)?;

    Ok(Json(MeResponse {
        redirect_to: landing_path(&auth.user),
        email: profile.as_ref().map(|p| p.email.clone()),
        display_name: profile.and_then(|p| p.display_name),
        user: auth.user,
    }))
}
