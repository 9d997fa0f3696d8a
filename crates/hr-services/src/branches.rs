//! Branch services
//!
//! Other collections reference a branch by title, so a rename or delete
//! cascades to every document carrying the old title.

use chrono::Utc;
use hr_contracts::branches::{DeleteBranchContract, SaveBranchContract};
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{OvertimeFilter, Store, WriteBatch};
use hr_models::Branch;

use crate::result::ServiceResult;

/// What a branch delete removed
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDeletion {
    pub branch: String,
    pub departments: usize,
    pub employees: usize,
    pub overtime_records: usize,
}

pub struct BranchService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> BranchService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    pub async fn list(&self) -> HrResult<Vec<Branch>> {
        Ok(self.store.list_branches().await?)
    }

    async fn find(&self, id: Id) -> HrResult<Branch> {
        self.store
            .get_branch(id)
            .await?
            .ok_or_else(|| HrError::not_found("Branch", id))
    }

    async fn ensure_title_free(&self, title: &str) -> HrResult<()> {
        if self.store.find_branch_by_title(title).await?.is_some() {
            return Err(HrError::conflict(format!("Branch '{title}' already exists")));
        }
        Ok(())
    }

    pub async fn create(&self, title: &str) -> ServiceResult<Branch> {
        let branch = Branch::new(title);
        if let Err(errors) = SaveBranchContract::new(self.user).validate(&branch) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::from_result(self.persist_new(branch).await)
    }

    async fn persist_new(&self, branch: Branch) -> HrResult<Branch> {
        self.ensure_title_free(&branch.title).await?;

        let mut batch = WriteBatch::new();
        batch.upsert_branch(branch.clone());
        self.store.commit(batch).await?;

        tracing::info!(branch = %branch.title, "branch created");
        Ok(branch)
    }

    /// Rename and cascade the new title. Unchanged titles are a no-op.
    pub async fn rename(&self, id: Id, title: &str) -> ServiceResult<Branch> {
        let existing = match self.find(id).await {
            Ok(branch) => branch,
            Err(err) => return err.into(),
        };

        let mut renamed = existing.clone();
        renamed.title = title.trim().to_string();
        if let Err(errors) = SaveBranchContract::new(self.user).validate(&renamed) {
            return ServiceResult::failure(errors);
        }
        if renamed.title == existing.title {
            return ServiceResult::success(existing);
        }

        ServiceResult::from_result(self.cascade_rename(&existing.title, renamed).await)
    }

    async fn cascade_rename(&self, old: &str, mut renamed: Branch) -> HrResult<Branch> {
        self.ensure_title_free(&renamed.title).await?;
        let new = renamed.title.clone();
        let scope = Some(old.to_string());
        renamed.updated_at = Some(Utc::now());

        let mut batch = WriteBatch::new();
        batch.upsert_branch(renamed.clone());

        for mut dept in self.store.list_departments(scope.clone()).await? {
            dept.branch = new.clone();
            batch.upsert_department(dept);
        }
        for mut employee in self.store.list_employees(scope.clone(), None).await? {
            employee.branch = new.clone();
            batch.upsert_employee(employee);
        }
        for mut scorecard in self.store.list_scorecards(scope.clone(), None).await? {
            scorecard.branch = new.clone();
            batch.upsert_scorecard(scorecard);
        }
        for mut profile in self.store.list_overtime_profiles(scope).await? {
            profile.branch = new.clone();
            batch.upsert_overtime_profile(profile);
        }
        let records = self
            .store
            .list_overtime_records(OvertimeFilter::default().in_branch(old))
            .await?;
        for mut record in records {
            record.branch = new.clone();
            batch.upsert_overtime_record(record);
        }
        for mut user in self.store.list_users().await? {
            if user.branch_scope() == Some(old) {
                user.branch_id = Some(new.clone());
                batch.upsert_user(user);
            }
        }

        let writes = batch.len();
        self.store.commit(batch).await?;
        tracing::info!(from = %old, to = %new, writes, "branch renamed");
        Ok(renamed)
    }

    /// Delete the branch with every department, employee, scorecard,
    /// overtime profile and overtime record under it
    pub async fn delete(&self, id: Id) -> ServiceResult<BranchDeletion> {
        let branch = match self.find(id).await {
            Ok(branch) => branch,
            Err(err) => return err.into(),
        };
        if let Err(errors) = DeleteBranchContract::new(self.user).validate(&branch) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::from_result(self.cascade_delete(branch).await)
    }

    async fn cascade_delete(&self, branch: Branch) -> HrResult<BranchDeletion> {
        let scope = Some(branch.title.clone());
        let mut batch = WriteBatch::new();
        batch.delete_branch(branch.id);

        let departments = self.store.list_departments(scope.clone()).await?;
        for dept in &departments {
            batch.delete_department(dept.id);
        }
        let employees = self.store.list_employees(scope.clone(), None).await?;
        for employee in &employees {
            batch.delete_employee(employee.id);
        }
        for scorecard in self.store.list_scorecards(scope.clone(), None).await? {
            batch.delete_scorecard(scorecard.employee_id);
        }
        for profile in self.store.list_overtime_profiles(scope).await? {
            batch.delete_overtime_profile(profile.employee_id);
        }
        let records = self
            .store
            .list_overtime_records(OvertimeFilter::default().in_branch(branch.title.clone()))
            .await?;
        for record in &records {
            batch.delete_overtime_record(record.id);
        }

        self.store.commit(batch).await?;
        tracing::info!(
            branch = %branch.title,
            departments = departments.len(),
            employees = employees.len(),
            overtime_records = records.len(),
            "branch deleted"
        );

        Ok(BranchDeletion {
            branch: branch.title,
            departments: departments.len(),
            employees: employees.len(),
            overtime_records: records.len(),
        })
    }
}
