//! Employee services
//!
//! Every add or edit goes through [`SyncService`] so the master record,
//! scorecard and overtime profile never drift apart.

use hr_contracts::employees::{
    CreateEmployeeContract, DeleteEmployeeContract, UpdateEmployeeContract,
};
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{OvertimeFilter, Store, WriteBatch};
use hr_models::{Employee, NewEmployee, UpdateEmployee};
use uuid::Uuid;

use crate::result::ServiceResult;
use crate::sync::SyncService;

pub struct EmployeeService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> EmployeeService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    /// Employees ordered by name. Blank filters match everything.
    pub async fn list(
        &self,
        branch: Option<&str>,
        department: Option<&str>,
    ) -> HrResult<Vec<Employee>> {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Ok(self
            .store
            .list_employees(clean(branch), clean(department))
            .await?)
    }

    pub async fn get(&self, id: Id) -> HrResult<Employee> {
        self.store
            .get_employee(id)
            .await?
            .ok_or_else(|| HrError::not_found("Employee", id))
    }

    pub async fn add(&self, request: NewEmployee) -> ServiceResult<Employee> {
        let input = request.into_input(self.user.id());
        if let Err(errors) = CreateEmployeeContract::new(self.user).validate(&input) {
            return ServiceResult::failure(errors);
        }

        let id = Uuid::new_v4();
        let sync = SyncService::new(self.store);
        ServiceResult::from_result(
            sync.sync_employee(id, &input, self.user.id())
                .await
                .map(|outcome| outcome.employee),
        )
    }

    /// Merge the update onto the stored record and resync. When the
    /// employee moved, the old location is recalculated too.
    pub async fn edit(&self, id: Id, update: UpdateEmployee) -> ServiceResult<Employee> {
        let contract = UpdateEmployeeContract::new(self.user);
        if let Err(errors) = contract.check_role() {
            return ServiceResult::failure(errors);
        }

        let existing = match self.get(id).await {
            Ok(employee) => employee,
            Err(err) => return err.into(),
        };

        let input = update.merge(&existing);
        if let Err(errors) = contract.validate(&input) {
            return ServiceResult::failure(errors);
        }

        let sync = SyncService::new(self.store);
        let outcome = match sync.sync_employee(id, &input, self.user.id()).await {
            Ok(outcome) => outcome,
            Err(err) => return err.into(),
        };

        let old_department = existing.department_or_unassigned();
        if existing.branch != outcome.employee.branch
            || old_department != outcome.employee.department
        {
            tracing::info!(
                employee_id = %id,
                from_branch = %existing.branch,
                from_department = %old_department,
                "employee moved"
            );
            sync.recalc_logged(&existing.branch, old_department).await;
        }

        ServiceResult::success(outcome.employee)
    }

    /// Remove the employee from every collection in one batch
    pub async fn delete(&self, id: Id) -> ServiceResult<Id> {
        if let Err(errors) = DeleteEmployeeContract::new(self.user).validate(&id) {
            return ServiceResult::failure(errors);
        }
        ServiceResult::from_result(self.delete_everywhere(id).await)
    }

    async fn delete_everywhere(&self, id: Id) -> HrResult<Id> {
        let location = match self.store.get_employee(id).await? {
            Some(employee) => Some((
                employee.branch.clone(),
                employee.department_or_unassigned().to_string(),
            )),
            None => self
                .store
                .get_scorecard(id)
                .await?
                .map(|s| (s.branch, s.department)),
        };
        let Some((branch, department)) = location else {
            return Err(HrError::not_found("Employee", id));
        };

        let records = self
            .store
            .list_overtime_records(OvertimeFilter::for_employee(id))
            .await?;
        let mut batch = WriteBatch::new();
        batch.delete_employee_everywhere(id, records.iter().map(|r| r.id));
        self.store.commit(batch).await?;

        tracing::info!(
            employee_id = %id,
            branch = %branch,
            department = %department,
            overtime_records = records.len(),
            "employee deleted"
        );

        SyncService::new(self.store)
            .recalc_logged(&branch, &department)
            .await;
        Ok(id)
    }
}
