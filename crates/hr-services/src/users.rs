//! User account services
//!
//! Password hashing stays outside this crate: callers pass a hashing
//! closure so the services only see the stored hash.

use hr_contracts::users::{
    AddUserContract, DeleteUserContract, RegisterUserContract, UpdateUserContract,
};
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{Store, WriteBatch};
use hr_models::{Branch, NewUser, Role, UserProfile};
use serde::{Deserialize, Serialize};

use crate::result::ServiceResult;

/// Admin changes to an account; absent fields stay as they are
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub role: Option<Role>,
    /// Blank clears the branch scope
    pub branch_id: Option<String>,
    pub approved: Option<bool>,
    pub display_name: Option<String>,
}

/// What the dashboard gate needs to know about a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub role: Role,
    pub approved: bool,
    pub branch_id: Option<String>,
}

impl Access {
    /// Access for an account without a profile
    pub fn missing_profile() -> Self {
        Self {
            role: Role::Viewer,
            approved: false,
            branch_id: None,
        }
    }
}

impl From<&UserProfile> for Access {
    fn from(profile: &UserProfile) -> Self {
        Self {
            role: profile.role,
            approved: profile.approved,
            branch_id: profile.branch_scope().map(str::to_string),
        }
    }
}

/// Unauthenticated account operations
pub struct AccountService<'a> {
    store: &'a dyn Store,
    min_password: usize,
}

impl<'a> AccountService<'a> {
    pub fn new(store: &'a dyn Store, min_password: usize) -> Self {
        Self {
            store,
            min_password,
        }
    }

    /// Self-registration: a viewer awaiting approval
    pub async fn register<H>(&self, request: NewUser, hash: H) -> ServiceResult<UserProfile>
    where
        H: FnOnce(&str) -> HrResult<String>,
    {
        if let Err(errors) = RegisterUserContract::new(self.min_password).validate(&request) {
            return ServiceResult::failure(errors);
        }
        ServiceResult::from_result(self.create(request, hash).await)
    }

    async fn create<H>(&self, request: NewUser, hash: H) -> HrResult<UserProfile>
    where
        H: FnOnce(&str) -> HrResult<String>,
    {
        ensure_email_free(self.store, &request.email).await?;
        let profile =
            UserProfile::registered(&request.email, clean(request.display_name), hash(&request.password)?);

        let mut batch = WriteBatch::new();
        batch.upsert_user(profile.clone());
        self.store.commit(batch).await?;

        tracing::info!(user_id = %profile.id, "user registered");
        Ok(profile)
    }

    /// Look up by email and check the password with `verify`
    pub async fn authenticate<V>(&self, email: &str, verify: V) -> HrResult<UserProfile>
    where
        V: FnOnce(&str) -> bool,
    {
        let invalid = || HrError::Unauthorized {
            message: "Invalid email or password".to_string(),
        };
        let profile = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or_else(invalid)?;
        if !verify(&profile.password_hash) {
            tracing::warn!(user_id = %profile.id, "failed login");
            return Err(invalid());
        }
        Ok(profile)
    }

    /// Current role and approval. A missing profile is an unapproved viewer.
    pub async fn resolve_access(&self, user_id: Id) -> HrResult<Access> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .map(|p| Access::from(&p))
            .unwrap_or_else(Access::missing_profile))
    }

    pub async fn profile(&self, user_id: Id) -> HrResult<UserProfile> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| HrError::not_found("User", user_id))
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn ensure_email_free(store: &dyn Store, email: &str) -> HrResult<()> {
    if store.find_user_by_email(email).await?.is_some() {
        return Err(HrError::conflict("An account with this email already exists"));
    }
    Ok(())
}

/// Stage the branch for `title` unless it already exists
async fn stage_branch(store: &dyn Store, batch: &mut WriteBatch, title: &str) -> HrResult<()> {
    if store.find_branch_by_title(title).await?.is_none() {
        tracing::info!(branch = %title, "creating branch for user scope");
        batch.upsert_branch(Branch::new(title));
    }
    Ok(())
}

/// Account administration by admins and approvers
pub struct UserService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> UserService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    pub async fn list(&self) -> HrResult<Vec<UserProfile>> {
        if !self.user.role().can_add_users() {
            return Err(HrError::forbidden("You are not authorized to list users"));
        }
        Ok(self.store.list_users().await?)
    }

    /// Create an approved account for someone else
    pub async fn add<H>(&self, request: NewUser, min_password: usize, hash: H) -> ServiceResult<UserProfile>
    where
        H: FnOnce(&str) -> HrResult<String>,
    {
        if let Err(errors) = AddUserContract::new(self.user, min_password).validate(&request) {
            return ServiceResult::failure(errors);
        }
        ServiceResult::from_result(self.create(request, hash).await)
    }

    async fn create<H>(&self, request: NewUser, hash: H) -> HrResult<UserProfile>
    where
        H: FnOnce(&str) -> HrResult<String>,
    {
        ensure_email_free(self.store, &request.email).await?;

        let mut profile =
            UserProfile::registered(&request.email, clean(request.display_name), hash(&request.password)?);
        profile.role = request.role.unwrap_or_default();
        profile.approved = true;
        profile.branch_id = clean(request.branch_id);

        let mut batch = WriteBatch::new();
        if let Some(branch) = profile.branch_id.as_deref() {
            stage_branch(self.store, &mut batch, branch).await?;
        }
        batch.upsert_user(profile.clone());
        self.store.commit(batch).await?;

        tracing::info!(user_id = %profile.id, role = %profile.role, added_by = %self.user.id(), "user added");
        Ok(profile)
    }

    pub async fn update(&self, id: Id, update: UpdateUser) -> ServiceResult<UserProfile> {
        let mut profile = match self.store.get_user(id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return HrError::not_found("User", id).into(),
            Err(err) => return HrError::from(err).into(),
        };
        if let Err(errors) = UpdateUserContract::new(self.user).validate(&profile) {
            return ServiceResult::failure(errors);
        }

        if let Some(role) = update.role {
            profile.role = role;
        }
        if let Some(approved) = update.approved {
            profile.approved = approved;
        }
        if let Some(name) = update.display_name {
            profile.display_name = clean(Some(name));
        }
        if let Some(branch) = update.branch_id {
            profile.branch_id = clean(Some(branch));
        }

        ServiceResult::from_result(self.persist(profile).await)
    }

    async fn persist(&self, profile: UserProfile) -> HrResult<UserProfile> {
        let mut batch = WriteBatch::new();
        if let Some(branch) = profile.branch_id.as_deref() {
            stage_branch(self.store, &mut batch, branch).await?;
        }
        batch.upsert_user(profile.clone());
        self.store.commit(batch).await?;

        tracing::info!(
            user_id = %profile.id,
            role = %profile.role,
            approved = profile.approved,
            branch = ?profile.branch_id,
            "user updated"
        );
        Ok(profile)
    }

    pub async fn delete(&self, id: Id) -> ServiceResult<Id> {
        let profile = match self.store.get_user(id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return HrError::not_found("User", id).into(),
            Err(err) => return HrError::from(err).into(),
        };
        if let Err(errors) = DeleteUserContract::new(self.user).validate(&profile) {
            return ServiceResult::failure(errors);
        }

        let mut batch = WriteBatch::new();
        batch.delete_user(id);
        if let Err(err) = self.store.commit(batch).await {
            return HrError::from(err).into();
        }
        tracing::info!(user_id = %id, "user deleted");
        ServiceResult::success(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockUser;
    use hr_db::MemoryStore;
    use uuid::Uuid;

    fn plain_hash(password: &str) -> HrResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn request(email: &str, role: Option<Role>, branch: Option<&str>) -> NewUser {
        NewUser {
            email: email.into(),
            password: "long enough pw".into(),
            display_name: Some(" Tigist ".into()),
            role,
            branch_id: branch.map(Into::into),
        }
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let store = MemoryStore::new();
        let accounts = AccountService::new(&store, 8);

        let profile = accounts
            .register(request("Tigist@Example.com", Some(Role::Admin), None), plain_hash)
            .await
            .into_result()
            .unwrap();
        assert_eq!(profile.role, Role::Viewer);
        assert!(!profile.approved);
        assert_eq!(profile.display_name.as_deref(), Some("Tigist"));

        let found = accounts
            .authenticate("tigist@example.com", |hash| hash == "hashed:long enough pw")
            .await
            .unwrap();
        assert_eq!(found.id, profile.id);

        let err = accounts.authenticate("tigist@example.com", |_| false).await.unwrap_err();
        assert_eq!(err.status_code(), 401);

        let dup = accounts
            .register(request("tigist@example.com", None, None), plain_hash)
            .await;
        assert_eq!(dup.into_result().unwrap_err().status_code(), 409);
    }

    #[tokio::test]
    async fn test_missing_profile_is_unapproved_viewer() {
        let store = MemoryStore::new();
        let access = AccountService::new(&store, 8)
            .resolve_access(Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(access, Access::missing_profile());
    }

    #[tokio::test]
    async fn test_update_creates_unknown_branch() {
        let store = MemoryStore::new();
        let profile = AccountService::new(&store, 8)
            .register(request("a@b.co", None, None), plain_hash)
            .await
            .into_result()
            .unwrap();

        let admin = MockUser::admin();
        let updated = UserService::new(&store, &admin)
            .update(
                profile.id,
                UpdateUser {
                    role: Some(Role::Approver),
                    branch_id: Some(" Hawassa ".into()),
                    approved: Some(true),
                    display_name: None,
                },
            )
            .await
            .into_result()
            .unwrap();

        assert_eq!(updated.role, Role::Approver);
        assert!(updated.approved);
        assert_eq!(updated.branch_id.as_deref(), Some("Hawassa"));
        assert!(store.find_branch_by_title("Hawassa").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_approver_adds_approved_viewer() {
        let store = MemoryStore::new();
        let approver = MockUser::approver(Some("Bole"));
        let service = UserService::new(&store, &approver);

        let added = service
            .add(request("new@b.co", None, Some("Bole")), 8, plain_hash)
            .await
            .into_result()
            .unwrap();
        assert_eq!(added.role, Role::Viewer);
        assert!(added.approved);

        let denied = service.update(added.id, UpdateUser::default()).await;
        assert_eq!(denied.into_result().unwrap_err().status_code(), 403);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let profile = AccountService::new(&store, 8)
            .register(request("gone@b.co", None, None), plain_hash)
            .await
            .into_result()
            .unwrap();

        let admin = MockUser::admin();
        UserService::new(&store, &admin)
            .delete(profile.id)
            .await
            .into_result()
            .unwrap();
        assert!(store.get_user(profile.id).await.unwrap().is_none());
    }
}
