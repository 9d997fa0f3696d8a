//! Axum extractors and shared state

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use hr_auth::{
    evaluate, extract_bearer_token, CurrentUser, JwtService, Requirement, SessionState,
    SessionStore,
};
use hr_core::config::AuthConfig;
use hr_db::Store;
use hr_services::users::AccountService;
use std::sync::Arc;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub jwt: Arc<JwtService>,
    pub sessions: Arc<SessionStore>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth: AuthConfig) -> Self {
        Self {
            store,
            jwt: Arc::new(JwtService::new(
                auth.jwt_secret.as_bytes(),
                auth.token_expiration_seconds,
            )),
            sessions: Arc::new(SessionStore::new()),
            auth: Arc::new(auth),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn accounts(&self) -> AccountService<'_> {
        AccountService::new(self.store(), self.auth.password_min_length)
    }
}

/// Signed-in caller, approved or not
pub struct AuthenticatedUser {
    pub user: CurrentUser,
    pub session_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let claims = app_state
            .jwt
            .validate_token(token)
            .map_err(hr_core::error::HrError::from)?;
        let user_id = claims.user_id().map_err(hr_core::error::HrError::from)?;

        let session_id = claims
            .sid
            .filter(|sid| app_state.sessions.is_active(sid, user_id))
            .ok_or_else(|| ApiError::unauthorized("Session has expired or was revoked"))?;

        // Role and approval come from the live profile, not the token
        let access = app_state.accounts().resolve_access(user_id).await?;
        Ok(AuthenticatedUser {
            user: CurrentUser {
                id: user_id,
                role: access.role,
                approved: access.approved,
                branch_id: access.branch_id,
            },
            session_id,
        })
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// Signed-in caller whose account has been approved
pub struct ApprovedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for ApprovedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser { user, .. } =
            AuthenticatedUser::from_request_parts(parts, state).await?;
        let session = SessionState::Authenticated(user.clone());
        evaluate(&session, &Requirement::any_role()).into_result()?;
        Ok(ApprovedUser(user))
    }
}

impl std::ops::Deref for ApprovedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
