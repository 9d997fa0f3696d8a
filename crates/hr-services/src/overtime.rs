//! Overtime services: filing, approval, visibility and display repair

use chrono::Utc;
use hr_contracts::overtime::{
    DeleteOvertimeContract, SubmitOvertimeContract, UpdateOvertimeStatusContract,
};
use hr_contracts::{Contract, UserContext};
use hr_core::error::{HrError, HrResult};
use hr_core::traits::Id;
use hr_db::{OvertimeFilter, Store, WriteBatch};
use hr_models::{
    overtime_amount, DisplayStatus, NewOvertimeRecord, OvertimeRecord, OvertimeStatus,
};
use uuid::Uuid;

use crate::result::ServiceResult;

/// Comment stamped on every status decision
pub const STATUS_COMMENT: &str = "Status updated via dashboard action.";

/// Amount and status to show for a stored record.
///
/// A missing or zero amount is recomputed from hours, type and salary.
/// A missing status reads "Data Inconsistent" when money is owed and
/// "No Status" otherwise.
pub fn repair_for_display(record: &OvertimeRecord, salary: f64) -> (f64, DisplayStatus) {
    let amount = if record.amount.is_finite() && record.amount != 0.0 {
        record.amount
    } else {
        overtime_amount(record.hours, record.ot_type, salary)
    };

    let status = match record.status {
        Some(status) => DisplayStatus::Recorded(status),
        None if amount > 0.0 => DisplayStatus::DataInconsistent,
        None => DisplayStatus::NoStatus,
    };
    (amount, status)
}

pub struct OvertimeService<'a, U: UserContext> {
    store: &'a dyn Store,
    user: &'a U,
}

impl<'a, U: UserContext> OvertimeService<'a, U> {
    pub fn new(store: &'a dyn Store, user: &'a U) -> Self {
        Self { store, user }
    }

    async fn find(&self, id: Id) -> HrResult<OvertimeRecord> {
        self.store
            .get_overtime_record(id)
            .await?
            .ok_or_else(|| HrError::not_found("OvertimeRecord", id))
    }

    /// File a claim. The amount is fixed at submission time.
    pub async fn submit(&self, request: NewOvertimeRecord) -> ServiceResult<OvertimeRecord> {
        let employee = match self.store.get_employee(request.employee_id).await {
            Ok(Some(employee)) => employee,
            Ok(None) => return HrError::not_found("Employee", request.employee_id).into(),
            Err(err) => return HrError::from(err).into(),
        };

        let contract = SubmitOvertimeContract::new(self.user, employee.salary);
        if let Err(errors) = contract.validate(&request) {
            return ServiceResult::failure(errors);
        }

        let now = Utc::now();
        let record = OvertimeRecord {
            id: Uuid::new_v4(),
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            branch: employee.branch.clone(),
            date: request.date.unwrap_or_else(|| now.date_naive()),
            hours: request.hours,
            ot_type: request.ot_type,
            description: request.description.trim().to_string(),
            amount: overtime_amount(request.hours, request.ot_type, employee.salary),
            status: Some(OvertimeStatus::Pending),
            submitted_by: self.user.id(),
            manager_comment: None,
            approved_by: None,
            approval_timestamp: None,
            created_at: now,
        };

        let mut batch = WriteBatch::new();
        batch.upsert_overtime_record(record.clone());
        if let Err(err) = self.store.commit(batch).await {
            return HrError::from(err).into();
        }

        tracing::info!(
            record_id = %record.id,
            employee_id = %record.employee_id,
            hours = record.hours,
            ot_type = %record.ot_type,
            amount = record.amount,
            "overtime submitted"
        );
        ServiceResult::success(record)
    }

    /// Approve or disapprove. Approvers scoped to a branch may only decide
    /// on that branch's claims.
    pub async fn update_status(
        &self,
        id: Id,
        status: OvertimeStatus,
    ) -> ServiceResult<OvertimeRecord> {
        if let Err(errors) = UpdateOvertimeStatusContract::new(self.user).validate(&status) {
            return ServiceResult::failure(errors);
        }
        ServiceResult::from_result(self.decide(id, status).await)
    }

    async fn decide(&self, id: Id, status: OvertimeStatus) -> HrResult<OvertimeRecord> {
        let mut record = self.find(id).await?;
        let redecided = !record.is_pending();
        if let Some(scope) = self.branch_scope() {
            if record.branch != scope {
                return Err(HrError::forbidden(format!(
                    "Overtime record belongs to branch '{}'",
                    record.branch
                )));
            }
        }

        record.status = Some(status);
        record.manager_comment = Some(STATUS_COMMENT.to_string());
        record.approved_by = Some(self.user.id());
        record.approval_timestamp = Some(Utc::now());

        let mut batch = WriteBatch::new();
        batch.upsert_overtime_record(record.clone());
        self.store.commit(batch).await?;

        tracing::info!(
            record_id = %id,
            status = %status,
            approver = %self.user.id(),
            redecided,
            "overtime decided"
        );
        Ok(record)
    }

    pub async fn delete(&self, id: Id) -> ServiceResult<Id> {
        let record = match self.find(id).await {
            Ok(record) => record,
            Err(err) => return err.into(),
        };
        if let Err(errors) = DeleteOvertimeContract::new(self.user).validate(&record) {
            return ServiceResult::failure(errors);
        }

        let mut batch = WriteBatch::new();
        batch.delete_overtime_record(id);
        if let Err(err) = self.store.commit(batch).await {
            return HrError::from(err).into();
        }
        tracing::info!(record_id = %id, "overtime deleted");
        ServiceResult::success(id)
    }

    /// Records of one employee, newest first. Viewers only see the claims
    /// they filed themselves.
    pub async fn records_for_employee(&self, employee_id: Id) -> HrResult<Vec<OvertimeRecord>> {
        let mut filter = OvertimeFilter::for_employee(employee_id);
        if !self.user.role().sees_all_overtime() {
            filter = filter.submitted_by(self.user.id());
        }
        Ok(self.store.list_overtime_records(filter).await?)
    }

    /// Pending claims, limited to the approver's branch when scoped
    pub async fn approver_queue(&self) -> HrResult<Vec<OvertimeRecord>> {
        if !self.user.is_approver() && !self.user.is_admin() {
            return Err(HrError::forbidden("Only approvers can view the approval queue"));
        }
        let mut filter = OvertimeFilter::pending();
        if let Some(branch) = self.branch_scope() {
            filter = filter.in_branch(branch);
        }
        Ok(self.store.list_overtime_records(filter).await?)
    }

    fn branch_scope(&self) -> Option<&str> {
        self.user
            .branch_id()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::EmployeeService;
    use crate::test_support::{seed_branch, MockUser};
    use chrono::NaiveDate;
    use hr_db::MemoryStore;
    use hr_models::{NewEmployee, OvertimeType};

    async fn employee(store: &MemoryStore, branch: &str, salary: f64) -> Id {
        seed_branch(store, branch).await;
        let admin = MockUser::admin();
        EmployeeService::new(store, &admin)
            .add(NewEmployee {
                name: format!("Worker {branch}"),
                role: "Driver".into(),
                salary,
                branch: branch.into(),
                department: None,
                metrics: None,
            })
            .await
            .into_result()
            .unwrap()
            .id
    }

    fn claim(employee_id: Id, hours: f64) -> NewOvertimeRecord {
        NewOvertimeRecord {
            employee_id,
            date: NaiveDate::from_ymd_opt(2024, 5, 10),
            hours,
            ot_type: OvertimeType::Holiday,
            description: "Holiday delivery".into(),
        }
    }

    fn legacy(amount: f64, status: Option<OvertimeStatus>) -> OvertimeRecord {
        OvertimeRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: "Old".into(),
            branch: "Bole".into(),
            date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            hours: 2.0,
            ot_type: OvertimeType::Holiday,
            description: String::new(),
            amount,
            status,
            submitted_by: Uuid::new_v4(),
            manager_comment: None,
            approved_by: None,
            approval_timestamp: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_repair_recomputes_zero_amount() {
        let (amount, status) = repair_for_display(&legacy(0.0, None), 17_333.0);
        assert!((amount - 500.0).abs() < 1e-9);
        assert_eq!(status, DisplayStatus::DataInconsistent);

        let (amount, status) = repair_for_display(&legacy(0.0, None), 0.0);
        assert_eq!(amount, 0.0);
        assert_eq!(status, DisplayStatus::NoStatus);

        let (amount, status) =
            repair_for_display(&legacy(120.0, Some(OvertimeStatus::Approved)), 17_333.0);
        assert_eq!(amount, 120.0);
        assert_eq!(status, DisplayStatus::Recorded(OvertimeStatus::Approved));
    }

    #[tokio::test]
    async fn test_submit_computes_amount() {
        let store = MemoryStore::new();
        let id = employee(&store, "Bole", 17_333.0).await;
        let viewer = MockUser::viewer();

        let record = OvertimeService::new(&store, &viewer)
            .submit(claim(id, 2.0))
            .await
            .into_result()
            .unwrap();
        assert!((record.amount - 500.0).abs() < 1e-9);
        assert_eq!(record.status, Some(OvertimeStatus::Pending));
        assert_eq!(record.submitted_by, viewer.id);
        assert_eq!(record.branch, "Bole");
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let store = MemoryStore::new();
        let id = employee(&store, "Bole", 10_000.0).await;
        let viewer = MockUser::viewer();
        let service = OvertimeService::new(&store, &viewer);

        let result = service.submit(claim(id, 0.0)).await;
        assert!(result.errors().has_error("hours"));

        let missing = service.submit(claim(Uuid::new_v4(), 1.0)).await;
        assert_eq!(missing.into_result().unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_status_decision() {
        let store = MemoryStore::new();
        let id = employee(&store, "Bole", 10_000.0).await;
        let viewer = MockUser::viewer();
        let record = OvertimeService::new(&store, &viewer)
            .submit(claim(id, 1.0))
            .await
            .into_result()
            .unwrap();

        let approver = MockUser::approver(Some("Bole"));
        let decided = OvertimeService::new(&store, &approver)
            .update_status(record.id, OvertimeStatus::Approved)
            .await
            .into_result()
            .unwrap();
        assert_eq!(decided.status, Some(OvertimeStatus::Approved));
        assert_eq!(decided.manager_comment.as_deref(), Some(STATUS_COMMENT));
        assert_eq!(decided.approved_by, Some(approver.id));
        assert!(decided.approval_timestamp.is_some());

        let elsewhere = MockUser::approver(Some("Adama"));
        let err = OvertimeService::new(&store, &elsewhere)
            .update_status(record.id, OvertimeStatus::Disapproved)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_visibility_and_queue() {
        let store = MemoryStore::new();
        let bole = employee(&store, "Bole", 10_000.0).await;
        let adama = employee(&store, "Adama", 10_000.0).await;

        let filer = MockUser::viewer();
        let other = MockUser::viewer();
        OvertimeService::new(&store, &filer).submit(claim(bole, 1.0)).await.into_result().unwrap();
        OvertimeService::new(&store, &other).submit(claim(bole, 2.0)).await.into_result().unwrap();
        OvertimeService::new(&store, &other).submit(claim(adama, 3.0)).await.into_result().unwrap();

        let own = OvertimeService::new(&store, &filer).records_for_employee(bole).await.unwrap();
        assert_eq!(own.len(), 1);

        let admin = MockUser::admin();
        let all = OvertimeService::new(&store, &admin).records_for_employee(bole).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = MockUser::approver(Some("Bole"));
        let queue = OvertimeService::new(&store, &scoped).approver_queue().await.unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|r| r.branch == "Bole"));

        let unscoped = MockUser::approver(None);
        assert_eq!(OvertimeService::new(&store, &unscoped).approver_queue().await.unwrap().len(), 3);

        assert!(OvertimeService::new(&store, &filer).approver_queue().await.is_err());
    }

    #[tokio::test]
    async fn test_only_admin_deletes() {
        let store = MemoryStore::new();
        let id = employee(&store, "Bole", 10_000.0).await;
        let viewer = MockUser::viewer();
        let record = OvertimeService::new(&store, &viewer)
            .submit(claim(id, 1.0))
            .await
            .into_result()
            .unwrap();

        let denied = OvertimeService::new(&store, &viewer).delete(record.id).await;
        assert_eq!(denied.into_result().unwrap_err().status_code(), 403);

        let admin = MockUser::admin();
        OvertimeService::new(&store, &admin).delete(record.id).await.into_result().unwrap();
        assert!(store.get_overtime_record(record.id).await.unwrap().is_none());
    }
}
