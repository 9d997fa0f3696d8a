//! Department services

use chrono::Utc;
use hr_contracts::departments::{DeleteDepartmentContract, SaveDepartmentContract};
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{OvertimeFilter, Store, WriteBatch};
use hr_models::Department;

use crate::result::ServiceResult;
use crate::sync::SyncService;

pub struct DepartmentService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> DepartmentService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    /// Departments, optionally limited to one branch
    pub async fn list(&self, branch: Option<&str>) -> HrResult<Vec<Department>> {
        let branch = branch.map(str::trim).filter(|b| !b.is_empty());
        Ok(self
            .store
            .list_departments(branch.map(str::to_string))
            .await?)
    }

    async fn find(&self, id: Id) -> HrResult<Department> {
        self.store
            .get_department(id)
            .await?
            .ok_or_else(|| HrError::not_found("Department", id))
    }

    async fn ensure_free(&self, branch: &str, title: &str) -> HrResult<()> {
        if self.store.find_department(branch, title).await?.is_some() {
            return Err(HrError::conflict(format!(
                "Department '{title}' already exists in {branch}"
            )));
        }
        Ok(())
    }

    pub async fn create(&self, branch: &str, title: &str) -> ServiceResult<Department> {
        let department = Department::new(branch, title);
        if let Err(errors) = SaveDepartmentContract::new(self.user).validate(&department) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::from_result(self.persist_new(department).await)
    }

    async fn persist_new(&self, department: Department) -> HrResult<Department> {
        if self
            .store
            .find_branch_by_title(&department.branch)
            .await?
            .is_none()
        {
            return Err(HrError::NotFound {
                entity: "Branch",
                field: "title",
                value: department.branch.clone(),
            });
        }
        self.ensure_free(&department.branch, &department.title)
            .await?;

        let mut batch = WriteBatch::new();
        batch.upsert_department(department.clone());
        self.store.commit(batch).await?;
        tracing::info!(branch = %department.branch, department = %department.title, "department created");

        let sync = SyncService::new(self.store);
        sync.recalc_logged(&department.branch, &department.title)
            .await;

        Ok(self
            .store
            .get_department(department.id)
            .await?
            .unwrap_or(department))
    }

    /// Rename within the same branch, carrying employees, scorecards and
    /// overtime profiles along
    pub async fn rename(&self, id: Id, title: &str) -> ServiceResult<Department> {
        let existing = match self.find(id).await {
            Ok(department) => department,
            Err(err) => return err.into(),
        };

        let mut renamed = existing.clone();
        renamed.title = title.trim().to_string();
        if let Err(errors) = SaveDepartmentContract::new(self.user).validate(&renamed) {
            return ServiceResult::failure(errors);
        }
        if renamed.title == existing.title {
            return ServiceResult::success(existing);
        }

        ServiceResult::from_result(self.cascade_rename(&existing.title, renamed).await)
    }

    async fn cascade_rename(&self, old: &str, mut renamed: Department) -> HrResult<Department> {
        self.ensure_free(&renamed.branch, &renamed.title).await?;
        let branch = Some(renamed.branch.clone());
        let location = Some(old.to_string());
        renamed.updated_at = Some(Utc::now());

        let mut batch = WriteBatch::new();
        batch.upsert_department(renamed.clone());
        for mut employee in self
            .store
            .list_employees(branch.clone(), location.clone())
            .await?
        {
            employee.department = renamed.title.clone();
            batch.upsert_employee(employee);
        }
        for mut scorecard in self.store.list_scorecards(branch.clone(), location).await? {
            scorecard.department = renamed.title.clone();
            batch.upsert_scorecard(scorecard);
        }
        for mut profile in self.store.list_overtime_profiles(branch).await? {
            if profile.department == old {
                profile.department = renamed.title.clone();
                batch.upsert_overtime_profile(profile);
            }
        }

        self.store.commit(batch).await?;
        tracing::info!(branch = %renamed.branch, from = %old, to = %renamed.title, "department renamed");

        let sync = SyncService::new(self.store);
        sync.recalc_logged(&renamed.branch, &renamed.title).await;
        sync.recalc_logged(&renamed.branch, old).await;

        Ok(self
            .store
            .get_department(renamed.id)
            .await?
            .unwrap_or(renamed))
    }

    /// Delete the department and every employee filed under it
    pub async fn delete(&self, id: Id) -> ServiceResult<usize> {
        let department = match self.find(id).await {
            Ok(department) => department,
            Err(err) => return err.into(),
        };
        if let Err(errors) = DeleteDepartmentContract::new(self.user).validate(&department) {
            return ServiceResult::failure(errors);
        }

        ServiceResult::from_result(self.cascade_delete(department).await)
    }

    async fn cascade_delete(&self, department: Department) -> HrResult<usize> {
        let branch = Some(department.branch.clone());
        let title = Some(department.title.clone());

        let mut batch = WriteBatch::new();
        let employees = self
            .store
            .list_employees(branch.clone(), title.clone())
            .await?;
        for employee in &employees {
            let records = self
                .store
                .list_overtime_records(OvertimeFilter::for_employee(employee.id))
                .await?;
            batch.delete_employee_everywhere(employee.id, records.into_iter().map(|r| r.id));
        }
        // Copies whose master record is already gone
        for scorecard in self.store.list_scorecards(branch.clone(), title).await? {
            if !employees.iter().any(|e| e.id == scorecard.employee_id) {
                batch.delete_scorecard(scorecard.employee_id);
            }
        }
        for profile in self.store.list_overtime_profiles(branch).await? {
            if profile.department == department.title
                && !employees.iter().any(|e| e.id == profile.employee_id)
            {
                batch.delete_overtime_profile(profile.employee_id);
            }
        }
        batch.delete_department(department.id);

        self.store.commit(batch).await?;
        tracing::info!(
            branch = %department.branch,
            department = %department.title,
            employees = employees.len(),
            "department deleted"
        );

        let sync = SyncService::new(self.store);
        if let Err(err) = sync.recalc_branch(&department.branch).await {
            tracing::error!(branch = %department.branch, error = %err, "branch recalculation failed");
        }
        Ok(employees.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::EmployeeService;
    use crate::test_support::{seed_branch, MockUser};
    use hr_db::MemoryStore;
    use hr_models::{KpiMetrics, NewEmployee};

    async fn hire(store: &MemoryStore, admin: &MockUser, name: &str, dept: &str, score: u8) -> Id {
        let request = NewEmployee {
            name: name.into(),
            role: "Baker".into(),
            salary: 7_000.0,
            branch: "Bole".into(),
            department: Some(dept.into()),
            metrics: Some(KpiMetrics::uniform(score)),
        };
        EmployeeService::new(store, admin)
            .add(request)
            .await
            .into_result()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_requires_existing_branch() {
        let store = MemoryStore::new();
        let admin = MockUser::admin();
        let service = DepartmentService::new(&store, &admin);

        let err = service.create("Nowhere", "Sales").await.into_result().unwrap_err();
        assert_eq!(err.status_code(), 404);

        seed_branch(&store, "Bole").await;
        let dept = service.create(" Bole ", " Sales ").await.into_result().unwrap();
        assert_eq!((dept.branch.as_str(), dept.title.as_str()), ("Bole", "Sales"));

        let dup = service.create("Bole", "Sales").await.into_result().unwrap_err();
        assert_eq!(dup.status_code(), 409);
    }

    #[tokio::test]
    async fn test_rename_moves_employees_and_recalcs() {
        let store = MemoryStore::new();
        let admin = MockUser::admin();
        seed_branch(&store, "Bole").await;
        let service = DepartmentService::new(&store, &admin);
        let dept = service.create("Bole", "Bakery").await.into_result().unwrap();
        let employee = hire(&store, &admin, "Hana", "Bakery", 100).await;

        let renamed = service.rename(dept.id, "Pastry").await.into_result().unwrap();
        assert_eq!(renamed.title, "Pastry");
        assert_eq!(renamed.employee_count, 1);
        assert_eq!(renamed.avg_score, 100.0);

        assert_eq!(store.get_employee(employee).await.unwrap().unwrap().department, "Pastry");
        assert_eq!(store.get_scorecard(employee).await.unwrap().unwrap().department, "Pastry");
        assert_eq!(
            store.get_overtime_profile(employee).await.unwrap().unwrap().department,
            "Pastry"
        );
    }

    #[tokio::test]
    async fn test_delete_removes_employees_and_updates_branch() {
        let store = MemoryStore::new();
        let admin = MockUser::admin();
        seed_branch(&store, "Bole").await;
        let service = DepartmentService::new(&store, &admin);
        let bakery = service.create("Bole", "Bakery").await.into_result().unwrap();
        service.create("Bole", "Front").await.into_result().unwrap();
        let gone = hire(&store, &admin, "Hana", "Bakery", 100).await;
        hire(&store, &admin, "Abel", "Front", 50).await;

        let branch = store.find_branch_by_title("Bole").await.unwrap().unwrap();
        assert_eq!(branch.employee_count, 2);

        let removed = service.delete(bakery.id).await.into_result().unwrap();
        assert_eq!(removed, 1);
        assert!(store.get_employee(gone).await.unwrap().is_none());
        assert!(store.get_scorecard(gone).await.unwrap().is_none());

        let branch = store.find_branch_by_title("Bole").await.unwrap().unwrap();
        assert_eq!(branch.employee_count, 1);
        assert_eq!(branch.avg_score, 50.0);
    }

    #[tokio::test]
    async fn test_list_filters_by_branch() {
        let store = MemoryStore::new();
        let admin = MockUser::admin();
        seed_branch(&store, "Bole").await;
        seed_branch(&store, "Adama").await;
        let service = DepartmentService::new(&store, &admin);
        service.create("Bole", "Bakery").await.into_result().unwrap();
        service.create("Adama", "Front").await.into_result().unwrap();

        assert_eq!(service.list(Some("Bole")).await.unwrap().len(), 1);
        assert_eq!(service.list(Some(" ")).await.unwrap().len(), 2);
        assert_eq!(service.list(None).await.unwrap().len(), 2);
    }
}
