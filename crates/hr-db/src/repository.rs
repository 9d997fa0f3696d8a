//! Store trait and shared repository types
//!
//! Every collection is read through [`Store`] and written through a
//! [`WriteBatch`] handed to [`Store::commit`]. Postgres and the in-memory
//! store both apply a batch all-or-nothing.

use async_trait::async_trait;
use hr_core::error::HrError;
use hr_core::traits::Id;
use hr_models::{
    Branch, Department, Employee, KpiScorecard, OvertimeProfile, OvertimeRecord, OvertimeStatus,
    UserProfile,
};

use crate::batch::WriteBatch;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Stored value could not be decoded: {0}")]
    Decode(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for HrError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => HrError::NotFound {
                entity: "Record",
                field: "id",
                value: what,
            },
            RepositoryError::Conflict(message) => HrError::Conflict { message },
            RepositoryError::Database(e) => HrError::Database(e.to_string()),
            RepositoryError::Decode(message) => HrError::Internal(message),
        }
    }
}

/// Filter for overtime record queries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OvertimeFilter {
    pub employee_id: Option<Id>,
    pub branch: Option<String>,
    pub status: Option<OvertimeStatus>,
    pub submitted_by: Option<Id>,
}

impl OvertimeFilter {
    pub fn for_employee(employee_id: Id) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn pending() -> Self {
        Self {
            status: Some(OvertimeStatus::Pending),
            ..Default::default()
        }
    }

    pub fn in_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn submitted_by(mut self, user_id: Id) -> Self {
        self.submitted_by = Some(user_id);
        self
    }

    pub fn matches(&self, record: &OvertimeRecord) -> bool {
        self.employee_id.map_or(true, |id| record.employee_id == id)
            && self.branch.as_deref().map_or(true, |b| record.branch == b)
            && self.status.map_or(true, |s| record.status == Some(s))
            && self.submitted_by.map_or(true, |u| record.submitted_by == u)
    }
}

/// Read access to every collection plus atomic batch writes
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_branch(&self, id: Id) -> RepositoryResult<Option<Branch>>;
    async fn find_branch_by_title(&self, title: &str) -> RepositoryResult<Option<Branch>>;
    /// Branches ordered by title
    async fn list_branches(&self) -> RepositoryResult<Vec<Branch>>;

    async fn get_department(&self, id: Id) -> RepositoryResult<Option<Department>>;
    async fn find_department(&self, branch: &str, title: &str)
        -> RepositoryResult<Option<Department>>;
    /// Departments ordered by branch then title
    async fn list_departments(&self, branch: Option<String>) -> RepositoryResult<Vec<Department>>;

    async fn get_employee(&self, id: Id) -> RepositoryResult<Option<Employee>>;
    /// Employees ordered by name
    async fn list_employees(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<Employee>>;

    async fn get_scorecard(&self, employee_id: Id) -> RepositoryResult<Option<KpiScorecard>>;
    async fn list_scorecards(
        &self,
        branch: Option<String>,
        department: Option<String>,
    ) -> RepositoryResult<Vec<KpiScorecard>>;

    async fn get_overtime_profile(&self, employee_id: Id)
        -> RepositoryResult<Option<OvertimeProfile>>;
    async fn list_overtime_profiles(
        &self,
        branch: Option<String>,
    ) -> RepositoryResult<Vec<OvertimeProfile>>;

    async fn get_overtime_record(&self, id: Id) -> RepositoryResult<Option<OvertimeRecord>>;
    /// Records ordered by date, newest first
    async fn list_overtime_records(
        &self,
        filter: OvertimeFilter,
    ) -> RepositoryResult<Vec<OvertimeRecord>>;

    async fn get_user(&self, id: Id) -> RepositoryResult<Option<UserProfile>>;
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<UserProfile>>;
    async fn list_users(&self) -> RepositoryResult<Vec<UserProfile>>;

    /// Apply every write in the batch, or none of them
    async fn commit(&self, batch: WriteBatch) -> RepositoryResult<()>;

    /// Check the backing store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use hr_models::OvertimeType;
    use uuid::Uuid;

    fn record(branch: &str, status: Option<OvertimeStatus>, submitter: Id) -> OvertimeRecord {
        OvertimeRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: "Hana".into(),
            branch: branch.into(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            hours: 2.0,
            ot_type: OvertimeType::Night,
            description: "Inventory".into(),
            amount: 100.0,
            status,
            submitted_by: submitter,
            manager_comment: None,
            approved_by: None,
            approval_timestamp: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_matching() {
        let submitter = Uuid::new_v4();
        let rec = record("Bole", Some(OvertimeStatus::Pending), submitter);

        assert!(OvertimeFilter::default().matches(&rec));
        assert!(OvertimeFilter::pending().in_branch("Bole").matches(&rec));
        assert!(!OvertimeFilter::pending().in_branch("Adama").matches(&rec));
        assert!(OvertimeFilter::for_employee(rec.employee_id)
            .submitted_by(submitter)
            .matches(&rec));
        assert!(!OvertimeFilter::default()
            .submitted_by(Uuid::new_v4())
            .matches(&rec));
    }

    #[test]
    fn test_missing_status_never_matches_status_filter() {
        let rec = record("Bole", None, Uuid::new_v4());
        assert!(!OvertimeFilter::pending().matches(&rec));
    }

    #[test]
    fn test_error_conversion() {
        let err: HrError = RepositoryError::Conflict("duplicate".into()).into();
        assert_eq!(err.status_code(), 409);
    }
}
